use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::render_scalar;

/// Format output as tables using the tabled crate.
///
/// Envelope outputs print the scalar result fields first, then one sub-table
/// per nested list (installments, rankings, receipt series), then warnings
/// and methodology.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section(result);
                print_envelope_footer(map);
            } else {
                print_section(value);
            }
        }
        Value::Array(arr) => print_record_table(arr),
        _ => println!("{}", value),
    }
}

fn print_section(value: &Value) {
    match value {
        Value::Object(map) => {
            let scalars: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !is_record_list(v)).collect();

            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in &scalars {
                    builder.push_record([key.as_str(), &render_scalar(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in map {
                if let Value::Array(arr) = val {
                    if is_record_list(val) {
                        println!("\n{}:", key);
                        print_record_table(arr);
                    }
                }
            }
        }
        Value::Array(arr) => print_record_table(arr),
        _ => println!("{}", value),
    }
}

fn print_record_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", render_scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(render_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn print_envelope_footer(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

/// A non-empty array whose elements are objects (one record per row).
fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.first().is_some_and(Value::is_object))
}
