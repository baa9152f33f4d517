#![no_main]

use libfuzzer_sys::fuzz_target;
use xml::{SaxEvent, Tokenizer, TokenizerConfig, VecEventSink};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    // Tiny chunks exercise char-boundary splitting of CDATA values.
    let config = TokenizerConfig { cdata_chunk_len: 3 };
    let mut events = Vec::new();
    let mut tokenizer = Tokenizer::new(&input, config);
    tokenizer
        .run(&mut VecEventSink(&mut events))
        .expect("buffering sink never rejects events");

    let mut previous = None;
    for (index, (event, now)) in events.iter().enumerate() {
        if let Some(previous) = previous {
            assert!(
                now.offset >= previous,
                "cursor moved backwards at event {index}: {event:?}"
            );
        }
        previous = Some(now.offset);
        if matches!(event, SaxEvent::Error(_)) {
            assert_eq!(index + 1, events.len(), "events continued after an error");
        }
    }
    assert!(now_within_input(&input, tokenizer.now().offset));
});

fn now_within_input(input: &str, offset: usize) -> bool {
    offset <= input.chars().count()
}
