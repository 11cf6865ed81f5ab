// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use pulp_console::fields::normalize_resource_reference;

fuzz_target!(|data: &str| {
    let normalized = normalize_resource_reference(data);
    // Normalizing twice changes nothing
    assert_eq!(normalize_resource_reference(&normalized), normalized);
});
