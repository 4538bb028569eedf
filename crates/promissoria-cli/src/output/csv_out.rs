use serde_json::Value;
use std::io;

use super::render_scalar;

/// Write output as CSV to stdout.
///
/// When the result carries exactly one nested list of records (a schedule's
/// installments, a debtor ranking, a receipt series), that list becomes the
/// CSV body; otherwise the result flattens to field,value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => {
            let lists: Vec<&Value> = map
                .values()
                .filter(|v| matches!(v, Value::Array(arr) if arr.first().is_some_and(Value::is_object)))
                .collect();

            if lists.len() == 1 {
                write_records(&mut wtr, lists[0].as_array().unwrap());
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &render_scalar(val)]);
                }
            }
        }
        Value::Array(arr) => write_records(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&render_scalar(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&render_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(render_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
