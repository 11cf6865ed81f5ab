// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use pulp_console::types::{Page, Task};

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<Page<serde_json::Value>>(data);
    let _ = serde_json::from_slice::<Page<Task>>(data);
});
