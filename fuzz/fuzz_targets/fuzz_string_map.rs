// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use pulp_console::fields::parse_string_map;

fuzz_target!(|data: &str| {
    // Accepted maps must serialize back to an object of strings
    if let Ok(Some(map)) = parse_string_map(data) {
        let value = serde_json::to_value(&map).unwrap();
        assert!(value.as_object().unwrap().values().all(serde_json::Value::is_string));
    }
});
