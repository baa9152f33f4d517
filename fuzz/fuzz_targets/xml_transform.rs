#![no_main]

use libfuzzer_sys::fuzz_target;
use xml::invariants::check_tree;
use xml::transform;

fuzz_target!(|data: &[u8]| {
    match transform(data) {
        Ok(root) => {
            if let Err(violation) = check_tree(&root) {
                panic!("tree invariant violated: {violation}");
            }
        }
        Err(message) => {
            assert!(
                !message.is_internal(),
                "internal error on fuzz input: {message}"
            );
        }
    }
});
