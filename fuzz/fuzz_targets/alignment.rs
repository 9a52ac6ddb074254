#![no_main]

use abcscope::diff::align;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |&b| b as usize).min(data.len().saturating_sub(1));
    let (a, b) = data.get(1..).unwrap_or_default().split_at(split);

    let script = align(a, b, |x, y| Ok(x == y)).unwrap();
    assert_eq!(script.apply(a, b), b);
    assert_eq!(script.kept_len() + script.deleted(), a.len());
    assert_eq!(script.kept_len() + script.inserted(), b.len());
});
