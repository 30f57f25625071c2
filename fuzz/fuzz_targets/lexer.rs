// fuzz_targets/lexer.rs
#![no_main]

use libfuzzer_sys::fuzz_target;
use luna_lexer::{EntryStack, Lexemes, Symbol};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let weighted: usize = s.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum();
    let max_tokens = s.chars().count();

    let mut tokens = 0usize;
    let mut accounted = 0usize;

    for tok in Lexemes::new(&s, EntryStack::new()) {
        // Real tokens are never zero-width and never sentinels.
        assert!(tok.span >= 1);
        assert!(!matches!(tok.element, Symbol::STX | Symbol::ETX));

        accounted += tok.span + tok.offset;
        assert!(accounted <= weighted);

        tokens += 1;
        assert!(tokens <= max_tokens, "possible hang on {s:?}");
    }
});
