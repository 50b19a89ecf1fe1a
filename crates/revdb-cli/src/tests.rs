use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["revdb", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["revdb", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["revdb"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn discover_collects_all_query_words() {
    let cli = Cli::try_parse_from(["revdb", "discover", "eczane", "İstanbul", "Kadıköy"]).unwrap();
    let Some(Commands::Discover { query, headless }) = cli.command else {
        panic!("expected discover command");
    };
    assert_eq!(query.join(" "), "eczane İstanbul Kadıköy");
    assert!(!headless);
}

#[test]
fn discover_accepts_quoted_query_and_headless() {
    let cli = Cli::try_parse_from([
        "revdb",
        "discover",
        "pet shop Springfield Downtown",
        "--headless",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Discover { ref query, headless: true }) if query.len() == 1
    ));
}

#[test]
fn discover_requires_a_query() {
    assert!(Cli::try_parse_from(["revdb", "discover"]).is_err());
}

#[test]
fn collect_defaults() {
    let cli = Cli::try_parse_from(["revdb", "collect"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            limit: None,
            headless: false,
            retry_failed: false,
            timeout_secs: None,
        })
    ));
}

#[test]
fn collect_with_all_flags() {
    let cli = Cli::try_parse_from([
        "revdb",
        "collect",
        "--limit",
        "1",
        "--headless",
        "--retry-failed",
        "--timeout-secs",
        "600",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            limit: Some(1),
            headless: true,
            retry_failed: true,
            timeout_secs: Some(600),
        })
    ));
}

#[test]
fn collect_rejects_negative_limit() {
    assert!(Cli::try_parse_from(["revdb", "collect", "--limit", "-3"]).is_err());
}

#[test]
fn parses_queue_and_maintenance_commands() {
    assert!(matches!(
        Cli::try_parse_from(["revdb", "status"]).unwrap().command,
        Some(Commands::Status)
    ));
    assert!(matches!(
        Cli::try_parse_from(["revdb", "retry-failed"]).unwrap().command,
        Some(Commands::RetryFailed)
    ));
    assert!(matches!(
        Cli::try_parse_from(["revdb", "preprocess"]).unwrap().command,
        Some(Commands::Preprocess)
    ));
    assert!(matches!(
        Cli::try_parse_from(["revdb", "label"]).unwrap().command,
        Some(Commands::Label)
    ));
}

#[test]
fn aspects_text_with_rating() {
    let cli =
        Cli::try_parse_from(["revdb", "aspects", "Yemekler", "çok", "lezzetliydi", "--rating", "5"])
            .unwrap();
    let Some(Commands::Aspects {
        text,
        rating,
        all,
        limit,
    }) = cli.command
    else {
        panic!("expected aspects command");
    };
    assert_eq!(text.join(" "), "Yemekler çok lezzetliydi");
    assert_eq!(rating, Some(5));
    assert!(!all);
    assert_eq!(limit, 10);
}

#[test]
fn aspects_rating_out_of_range_is_rejected() {
    assert!(Cli::try_parse_from(["revdb", "aspects", "iyi", "--rating", "6"]).is_err());
    assert!(Cli::try_parse_from(["revdb", "aspects", "iyi", "--rating", "0"]).is_err());
}

#[test]
fn aspects_all_with_limit() {
    let cli = Cli::try_parse_from(["revdb", "aspects", "--all", "--limit", "25"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Aspects {
            all: true,
            limit: 25,
            ..
        })
    ));
}

#[test]
fn aspects_all_conflicts_with_text() {
    assert!(Cli::try_parse_from(["revdb", "aspects", "--all", "güzel"]).is_err());
}
