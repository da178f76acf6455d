//! ElevenLabs 常用音色

/// 默认音色（Adam）
pub const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";

/// 音色别名 -> 音色 ID
pub const VOICE_ALIASES: &[(&str, &str)] = &[
    ("adam", "pNInz6obpgDQGcFmaJgB"),
    ("aria", "9BWtsMINqrJLrRacOk9x"),
    ("sarah", "EXAVITQu4vr4xnSDxMaL"),
    ("laura", "FGY2WhTYpPnrIDTdsKH5"),
    ("charlie", "IKne3meq5aSn9XLyUdCD"),
    ("george", "JBFqnCBsd6RMkjVDRZzb"),
];

/// 别名解析为音色 ID，未知名称原样返回（视为 ID）
pub fn resolve_voice_id(name_or_id: &str) -> &str {
    VOICE_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name_or_id))
        .map_or(name_or_id, |(_, id)| id)
}
