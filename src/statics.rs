// Collector file keywords, expected totals, output layout and CLI strings.

// Section keywords (matched case-insensitively).
pub const KW_PREFIX: &str = "collecting_";
pub const KW_ENCHANT: &str = "enchant";
pub const KW_ITEM: &str = "item";
pub const KW_PREMIUM_ITEM: &str = "premiumitem";
pub const KW_PREMIUM_STATUS_ITEM: &str = "premiumstatusitem";

// Canonical spelling of each section header, used in messages.
pub const HDR_ENCHANT: &str = "Collecting_Enchant";
pub const HDR_ITEM: &str = "Collecting_Item";
pub const HDR_PREMIUM_ITEM: &str = "Collecting_PremiumItem";
pub const HDR_PREMIUM_STATUS_ITEM: &str = "Collecting_PremiumStatusItem";

// Syntax.
pub const COMMENT_MARKER: &str = "//";
pub const BRACE_OPEN: u8 = b'{';
pub const BRACE_CLOSE: u8 = b'}';
pub const ITEM_ID_PREFIX: &str = "II_";

// Expected totals: enchant chances are per mille, item weights per million.
pub const ENCHANT_TARGET: u64 = 1_000;
pub const ITEM_TARGET: u64 = 1_000_000;

// Serializer layout.
pub const ITEM_ID_COLUMN_WIDTH: usize = 30;

// Placeholder id for items added without an explicit id.
pub const DEFAULT_NEW_ITEM_ID: &str = "II_NEW_ITEM";

// Newline constants (used for section rendering; keep out of serializer code).
pub const NL_LF: &str = "\n";
pub const NL_CRLF: &str = "\r\n";

// English strings (EN_ prefix to make future localization easier)
pub const EN_SECTION_ENCHANT: &str = "Enchant";
pub const EN_SECTION_ITEMS: &str = "Items";
pub const EN_SECTION_PREMIUM_ITEMS: &str = "Premium items";
pub const EN_SECTION_PREMIUM_STATUS_ITEMS: &str = "Premium status items";

pub const EN_VALID: &str = "valid";
pub const EN_INVALID: &str = "INVALID";
pub const EN_ABSENT: &str = "absent";
pub const EN_PRESERVED: &str = "preserved";
pub const EN_REWRITTEN: &str = "rewritten";
pub const EN_EMPTY_SECTION: &str = "(no entries)";
pub const EN_ALL_VALID: &str = "All collector totals are valid.";
pub const EN_WARNING_PREFIX: &str = "warning:";
