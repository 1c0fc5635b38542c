use crate::digits::Width;
use crate::transform::NodeKind;
use cancel_this::CancelAtomic;

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// A trigger that is already cancelled, so the first cancellation check fails.
pub fn cancelled_trigger() -> CancelAtomic {
    let trigger = CancelAtomic::new();
    trigger.cancel();
    trigger
}

pub fn w(width: usize) -> Width {
    Width::new(width).unwrap()
}

/// A deliberately naive, string-based implementation of the map, used as an independent
/// reference when checking the arithmetic implementation.
pub fn naive_next(value: u64, width: usize) -> u64 {
    let padded = format!("{:0width$}", value, width = width);
    let mut ascending: Vec<char> = padded.chars().collect();
    ascending.sort();
    let descending: String = ascending.iter().rev().collect();
    let ascending: String = ascending.into_iter().collect();
    descending.parse::<u64>().unwrap() - ascending.parse::<u64>().unwrap()
}

/// Naive canonical signature (sorted padded digits).
pub fn naive_canonical(value: u64, width: usize) -> u64 {
    let mut digits: Vec<char> = format!("{:0width$}", value, width = width)
        .chars()
        .collect();
    digits.sort();
    digits.into_iter().collect::<String>().parse().unwrap()
}

/// The content of one `resources/known_cycles/*.txt` fixture.
///
/// The format is line based: `width N`, `nodes value|signature`, followed by one
/// `cycle a b c ...` line per cycle (each cycle starts at its smallest node and follows
/// the map). Empty lines and lines starting with `#` are ignored.
#[derive(Debug)]
pub struct KnownCycles {
    pub width: Width,
    pub kind: NodeKind,
    pub cycles: Vec<Vec<u64>>,
}

pub fn load_known_cycles(path: &str) -> KnownCycles {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Cannot read fixture {}: {}", path, e));
    let mut width = None;
    let mut kind = None;
    let mut cycles = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("width") => {
                let value: usize = parts.next().unwrap().parse().unwrap();
                width = Some(w(value));
            }
            Some("nodes") => {
                kind = Some(match parts.next() {
                    Some("value") => NodeKind::Value,
                    Some("signature") => NodeKind::Signature,
                    other => panic!("Unknown node kind {:?} in {}", other, path),
                });
            }
            Some("cycle") => {
                cycles.push(parts.map(|it| it.parse::<u64>().unwrap()).collect());
            }
            other => panic!("Unexpected fixture line {:?} in {}", other, path),
        }
    }
    cycles.sort();
    KnownCycles {
        width: width.expect("Fixture is missing `width`."),
        kind: kind.expect("Fixture is missing `nodes`."),
        cycles,
    }
}
