/// Checkpoint outcome codes.
///
/// Reserved for branch outcomes and never used as any other exit status.
pub const DIED_CODE: i32 = 10;

/// A portal was reached inside the branch.
pub const ADVANCED_LEVEL_CODE: i32 = 11;

/// The branch was quit explicitly.
pub const QUIT_CODE: i32 = 12;
