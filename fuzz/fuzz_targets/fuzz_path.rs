// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for scheme detection and VirtualPath handling

#![no_main]

use libfuzzer_sys::fuzz_target;
use pathmux_core::path::{self, VirtualPath};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let vpath = VirtualPath::parse(input);

        if let Some(scheme) = path::scheme_of(input) {
            assert!(path::is_valid_scheme(scheme));
            assert!(path::has_scheme(input, scheme));
            assert_eq!(vpath.scheme.as_deref(), Some(scheme));
            let _ = path::strip_scheme(input, scheme);
        }

        // Parsing the URI form again must be stable
        let uri = vpath.to_uri();
        assert_eq!(VirtualPath::parse(&uri), vpath);

        let _ = vpath.to_path_string();
        let _ = vpath.name();
        if let Some(parent) = vpath.parent() {
            assert!(vpath.starts_with(&parent));
        }

        if let Some(head) = input.get(..10) {
            let _ = vpath.join(head);
        }
    }
});
