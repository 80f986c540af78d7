//! Property-based tests for serial_logger using proptest

use proptest::prelude::*;
use serial_logger::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Critical),
    ]
}

// ============================================================================
// LogLevel
// ============================================================================

proptest! {
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    #[test]
    fn test_log_level_ordering_matches_rank(a in any_level(), b in any_level()) {
        prop_assert_eq!(a < b, a.as_u8() < b.as_u8());
        prop_assert_eq!(a == b, a.as_u8() == b.as_u8());
    }
}

// ============================================================================
// Filtering through the whole pipeline
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Output is exactly the subsequence that passes level and mask, in order.
    #[test]
    fn test_output_is_filtered_subsequence(
        min_level in any_level(),
        enabled_mask in any::<u32>(),
        messages in prop::collection::vec((any_level(), any::<u32>()), 0..64),
    ) {
        let capture = MemoryWriter::new();
        let logger = Logger::builder()
            .format(FormatOptions::plain())
            .mask(enabled_mask)
            .console_writer(capture.clone())
            .build();
        logger.start(min_level, None::<&str>).unwrap();

        for (i, (level, mask)) in messages.iter().enumerate() {
            logger.write(*mask, *level, Destinations::CONSOLE, "", format_args!("{}", i));
        }
        logger.stop();

        let expected: Vec<String> = messages
            .iter()
            .enumerate()
            .filter(|(_, (level, mask))| *level >= min_level && mask & enabled_mask != 0)
            .map(|(i, _)| i.to_string())
            .collect();
        prop_assert_eq!(capture.lines(), expected);
    }

    /// Undecorated output is the rendered text verbatim.
    #[test]
    fn test_plain_output_is_verbatim(text in "[^\r\n]{0,80}") {
        let capture = MemoryWriter::new();
        let logger = Logger::builder()
            .format(FormatOptions::plain())
            .console_writer(capture.clone())
            .build();
        logger.start(LogLevel::Debug, None::<&str>).unwrap();
        logger.write(MASK_ALL, LogLevel::Info, Destinations::CONSOLE, "fn_name", format_args!("{}", text));
        logger.stop();

        prop_assert_eq!(capture.contents(), format!("{}\n", text));
    }

    /// Every decoration keeps the caller's text as the line suffix.
    #[test]
    fn test_decoration_is_prefix_only(
        text in "[a-zA-Z0-9 %{}:]{0,40}",
        show_name in any::<bool>(),
        show_ids in any::<bool>(),
        show_function in any::<bool>(),
        show_level in any::<bool>(),
    ) {
        let options = FormatOptions::new(show_name, show_ids, show_function).with_level(show_level);
        let entry = LogEntry::new(LogLevel::Warn, MASK_SYS, Destinations::FILE, text.clone())
            .with_function("handler");
        prop_assert!(options.decorate(&entry).ends_with(&text));
    }
}

// ============================================================================
// Destinations
// ============================================================================

proptest! {
    #[test]
    fn test_destinations_iter_covers_bits(bits in 0u8..8) {
        let dest = Destinations::from_bits_truncate(bits);
        let rebuilt = dest.iter().fold(Destinations::NONE, |acc, flag| acc | flag);
        prop_assert_eq!(rebuilt, dest);
    }
}

#[test]
fn test_serde_shapes() {
    let json = serde_json::to_string(&LogLevel::Warn).unwrap();
    assert_eq!(json, "\"Warn\"");

    let dest: Destinations = serde_json::from_str("5").unwrap();
    assert_eq!(dest, Destinations::FILE | Destinations::CONSOLE);

    let options: FormatOptions = serde_json::from_str(
        r#"{"show_process_name":false,"show_pid_tid":true,"show_function_name":true}"#,
    )
    .unwrap();
    assert_eq!(options, FormatOptions::new(false, true, true));
}
