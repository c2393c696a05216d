use pretty_assertions::assert_eq;

use super::*;

#[test]
fn receivers_are_checked_by_default() {
    let config = CompileConfig::default();
    assert_eq!(config.receiver, ReceiverPolicy::Checked);
    assert!(config.casts_receiver());
}

#[test]
fn trusted_skips_the_cast() {
    let config = CompileConfig::with_receiver(ReceiverPolicy::Trusted);
    assert!(!config.casts_receiver());
}
