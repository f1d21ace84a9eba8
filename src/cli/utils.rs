/// Parses a hex string, with or without a `0x` prefix, into bytes.
pub fn parse_hex_bytes(arg: &str) -> Result<Vec<u8>, String> {
    let digits = arg.strip_prefix("0x").unwrap_or(arg);
    hex::decode(digits).map_err(|err| format!("invalid hex value `{arg}`: {err}"))
}
