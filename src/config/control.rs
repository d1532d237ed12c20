/// Control surface key bindings (lowercase; input is matched case-insensitively).
pub const KEY_UP: char = 'w';
pub const KEY_DOWN: char = 's';
pub const KEY_LEFT: char = 'a';
pub const KEY_RIGHT: char = 'd';
pub const KEY_QUIT: char = 'q';
pub const KEY_CHECKPOINT: char = 'g';
