use crate::types::{ScanCommand, ScanRequest};

/// What one line of input asks the terminal to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blank line
    Nothing,
    Help,
    Session,
    Export,
    Clear,
    Exit,
    Scan(ScanRequest),
    /// First token is not a known keyword
    Unknown(String),
    /// Recognized scan keyword with no target
    MissingArgument(ScanCommand),
}

/// Tokenize one input line and classify it. Session-management keywords
/// need no target; scan keywords require exactly one (extra tokens are
/// ignored). Rejections never reach the dispatcher or the ledger.
pub fn interpret(line: &str) -> Action {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Action::Nothing;
    };
    let keyword = first.to_ascii_lowercase();

    match keyword.as_str() {
        "help" => return Action::Help,
        "session" => return Action::Session,
        "export" => return Action::Export,
        "clear" => return Action::Clear,
        "exit" => return Action::Exit,
        _ => {}
    }

    let Some(command) = ScanCommand::parse(&keyword) else {
        return Action::Unknown(keyword);
    };

    match tokens.next() {
        Some(target) => Action::Scan(ScanRequest::new(command, target)),
        None => Action::MissingArgument(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackendKind;

    #[test]
    fn blank_input_is_a_no_op() {
        assert_eq!(interpret(""), Action::Nothing);
        assert_eq!(interpret("   \t  "), Action::Nothing);
    }

    #[test]
    fn session_management_keywords_need_no_target() {
        assert_eq!(interpret("help"), Action::Help);
        assert_eq!(interpret("session"), Action::Session);
        assert_eq!(interpret("export"), Action::Export);
        assert_eq!(interpret("clear"), Action::Clear);
        assert_eq!(interpret("exit"), Action::Exit);
        // case-insensitive like everything else
        assert_eq!(interpret("EXIT"), Action::Exit);
    }

    #[test]
    fn scan_keyword_with_target_builds_a_request() {
        match interpret("dlkp example.com") {
            Action::Scan(request) => {
                assert_eq!(request.command, ScanCommand::DnsLookup);
                assert_eq!(request.target, "example.com");
                assert_eq!(request.backend_kind(), BackendKind::NativeSingle);
            }
            other => panic!("expected scan action, got {:?}", other),
        }
    }

    #[test]
    fn keywords_route_to_the_declared_backends() {
        let cases = [
            ("adv john_doe", BackendKind::ScriptBased),
            ("wtnk john_doe", BackendKind::ScriptBased),
            ("fscn example.com", BackendKind::NativeComposite),
            ("ascn john_doe", BackendKind::NativeComposite),
            ("iplc 8.8.8.8", BackendKind::NativeSingle),
        ];
        for (line, backend) in cases {
            match interpret(line) {
                Action::Scan(request) => assert_eq!(request.backend_kind(), backend),
                other => panic!("{line:?} should dispatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_keyword_is_rejected_before_dispatch() {
        assert_eq!(
            interpret("zzqx target1"),
            Action::Unknown("zzqx".to_string())
        );
        assert_eq!(interpret("bogus"), Action::Unknown("bogus".to_string()));
    }

    #[test]
    fn recognized_keyword_without_target_is_missing_argument() {
        assert_eq!(
            interpret("dlkp"),
            Action::MissingArgument(ScanCommand::DnsLookup)
        );
        assert_eq!(
            interpret("adv"),
            Action::MissingArgument(ScanCommand::Advanced)
        );
    }

    #[test]
    fn extra_tokens_after_the_target_are_ignored() {
        match interpret("whis example.com trailing junk") {
            Action::Scan(request) => {
                assert_eq!(request.command, ScanCommand::Whois);
                assert_eq!(request.target, "example.com");
            }
            other => panic!("expected scan action, got {:?}", other),
        }
    }

    #[test]
    fn mixed_case_scan_keywords_are_accepted() {
        match interpret("FSCN Example.com") {
            Action::Scan(request) => {
                assert_eq!(request.command, ScanCommand::FullDomainScan);
                // targets are passed through untouched
                assert_eq!(request.target, "Example.com");
            }
            other => panic!("expected scan action, got {:?}", other),
        }
    }
}
