// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use certscan::inference::{infer_from_text, Category, Organization};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let details = infer_from_text(&text);

    if let Some(org) = details.organization {
        assert!(Organization::ALL.contains(&org));
    }
    if let Some(category) = details.category {
        assert!(Category::ALL.contains(&category));
    }
    if let Some(year) = details.year {
        assert!(year.len() == 4 && year.starts_with("20"));
    }
    assert_eq!(details, infer_from_text(&text));
});
