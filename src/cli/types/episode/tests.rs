use super::*;

#[test]
fn test_parse_episode_number() {
    assert_eq!(" 7 ".parse::<EpisodeNumber>().unwrap(), EpisodeNumber::new(7));
    assert!("seven".parse::<EpisodeNumber>().is_err());
    assert!("-1".parse::<EpisodeNumber>().is_err());
}

#[test]
fn test_episode_zero_is_not_an_episode() {
    assert!(matches!(
        "0".parse::<EpisodeNumber>(),
        Err(LedgerError::InvalidValue {
            field: "episode number",
            ..
        })
    ));
    assert!(EpisodeNumber::new(0).numbered().is_err());
    assert_eq!(EpisodeNumber::new(1).numbered().unwrap(), EpisodeNumber::new(1));
    assert_eq!(EpisodeNumber::new(0).through().count(), 0);
}
