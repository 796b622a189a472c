//! Wire codec for the matrix text protocol
//!
//! Stateless translation between command strings and wire bytes on the way
//! out, and between received lines and typed protocol events on the way in.
//! Also hosts [`LineBuffer`], which reassembles complete lines from the
//! arbitrary chunk boundaries TCP delivers.

use tracing::debug;

/// Line terminator the device expects on every outbound command
const LINE_TERMINATOR: &str = "\r\n";

/// One classified inbound line
///
/// Decoding is tolerant: duplicates and out-of-order updates are fine (every
/// event is an idempotent overwrite), and anything unrecognized decodes to
/// [`ProtocolEvent::NoOp`] rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Wholesale replacement of the virtual channel list
    ChannelList(Vec<String>),
    /// Wholesale replacement of the preset list
    PresetList(Vec<String>),
    /// Mute state change for a single channel
    ChannelMute { channel: String, muted: u8 },
    /// Mute state change for a single input/output crosspoint
    CrosspointMute {
        input: String,
        output: String,
        muted: u8,
    },
    /// Unrecognized or malformed line, ignored
    NoOp,
}

/// Encode a command for the wire by appending the `\r\n` terminator
pub fn encode_command(cmd: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(cmd.len() + LINE_TERMINATOR.len());
    bytes.extend_from_slice(cmd.as_bytes());
    bytes.extend_from_slice(LINE_TERMINATOR.as_bytes());
    bytes
}

/// Classify one received line into a protocol event
pub fn decode_line(line: &str) -> ProtocolEvent {
    if let Some(rest) = line.strip_prefix("virtual_channels=") {
        let names = rest.split(',').map(|s| s.trim().to_string()).collect();
        return ProtocolEvent::ChannelList(names);
    }

    if let Some(rest) = line.strip_prefix("presets=") {
        let names = rest
            .split(',')
            .map(|s| s.replace('"', "").trim().to_string())
            .collect();
        return ProtocolEvent::PresetList(names);
    }

    if let Some(rest) = line.strip_prefix("mute ") {
        return match parse_mute(rest) {
            Some((channel, muted)) => ProtocolEvent::ChannelMute { channel, muted },
            None => {
                debug!("Dropping malformed mute line: {:?}", line);
                ProtocolEvent::NoOp
            }
        };
    }

    if let Some(rest) = line.strip_prefix("crosspoint_mute ") {
        return match parse_crosspoint_mute(rest) {
            Some((input, output, muted)) => ProtocolEvent::CrosspointMute {
                input,
                output,
                muted,
            },
            None => {
                debug!("Dropping malformed crosspoint_mute line: {:?}", line);
                ProtocolEvent::NoOp
            }
        };
    }

    ProtocolEvent::NoOp
}

/// Parse a leading `"<name>"`, returning the name and the remainder
fn parse_quoted(rest: &str) -> Option<(String, &str)> {
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}

/// `"<channel>"=<value>`
fn parse_mute(rest: &str) -> Option<(String, u8)> {
    let (channel, rest) = parse_quoted(rest)?;
    let muted = rest.strip_prefix('=')?.trim().parse().ok()?;
    Some((channel, muted))
}

/// `"<input>" "<output>"=<value>`
fn parse_crosspoint_mute(rest: &str) -> Option<(String, String, u8)> {
    let (input, rest) = parse_quoted(rest)?;
    let rest = rest.strip_prefix(' ')?;
    let (output, rest) = parse_quoted(rest)?;
    let muted = rest.strip_prefix('=')?.trim().parse().ok()?;
    Some((input, output, muted))
}

/// Reassembles complete lines from arbitrary inbound byte chunks
///
/// One data event is not one line: chunks may arrive split or coalesced. A
/// trailing partial fragment is retained until a later chunk completes it.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line it unlocks
    ///
    /// Lines are split on `\n`; a trailing `\r` is stripped so both `\r\n`
    /// and bare `\n` terminated input decode the same way.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Bytes currently held back waiting for a terminator
    pub fn pending(&self) -> &str {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_appends_terminator() {
        assert_eq!(encode_command("get presets"), b"get presets\r\n");
        assert_eq!(encode_command(""), b"\r\n");
    }

    #[test]
    fn test_decode_channel_list_trims_whitespace() {
        let event = decode_line("virtual_channels=Ch1,Ch2, Ch3");
        assert_eq!(
            event,
            ProtocolEvent::ChannelList(vec![
                "Ch1".to_string(),
                "Ch2".to_string(),
                "Ch3".to_string()
            ])
        );
    }

    #[test]
    fn test_decode_preset_list_strips_quotes() {
        let event = decode_line(r#"presets="Preset A","Preset B""#);
        assert_eq!(
            event,
            ProtocolEvent::PresetList(vec!["Preset A".to_string(), "Preset B".to_string()])
        );
    }

    #[test]
    fn test_decode_channel_mute() {
        let event = decode_line(r#"mute "Main"=1"#);
        assert_eq!(
            event,
            ProtocolEvent::ChannelMute {
                channel: "Main".to_string(),
                muted: 1
            }
        );
    }

    #[test]
    fn test_decode_channel_mute_malformed_is_noop() {
        assert_eq!(decode_line("mute Main=1"), ProtocolEvent::NoOp);
        assert_eq!(decode_line(r#"mute "Main""#), ProtocolEvent::NoOp);
        assert_eq!(decode_line(r#"mute "Main"=x"#), ProtocolEvent::NoOp);
    }

    #[test]
    fn test_decode_crosspoint_mute() {
        let event = decode_line(r#"crosspoint_mute "In1" "Out2"=1"#);
        assert_eq!(
            event,
            ProtocolEvent::CrosspointMute {
                input: "In1".to_string(),
                output: "Out2".to_string(),
                muted: 1
            }
        );
    }

    #[test]
    fn test_decode_crosspoint_mute_missing_output_is_noop() {
        assert_eq!(decode_line(r#"crosspoint_mute "In1"=1"#), ProtocolEvent::NoOp);
    }

    #[test]
    fn test_decode_empty_and_unknown_lines_are_noop() {
        assert_eq!(decode_line(""), ProtocolEvent::NoOp);
        assert_eq!(decode_line("hello world"), ProtocolEvent::NoOp);
        assert_eq!(decode_line("gain \"Main\"=-12.0"), ProtocolEvent::NoOp);
    }

    #[test]
    fn test_line_buffer_reassembles_split_line() {
        let mut buffer = LineBuffer::new();
        assert_eq!(
            buffer.push(b"mute \"A\"=1\r\nmute \"B\""),
            vec!["mute \"A\"=1".to_string()]
        );
        assert_eq!(buffer.push(b"=0\r\n"), vec!["mute \"B\"=0".to_string()]);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn test_line_buffer_coalesced_chunk() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"virtual_channels=A,B\r\npresets=\"P\"\r\n");
        assert_eq!(lines, vec!["virtual_channels=A,B", "presets=\"P\""]);
    }

    #[test]
    fn test_line_buffer_bare_newline() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"mute \"A\"=1\n"), vec!["mute \"A\"=1"]);
    }

    proptest! {
        /// Lines without a recognized prefix always decode to NoOp
        #[test]
        fn prop_unrecognized_lines_are_noop(line in "\\PC*") {
            prop_assume!(!line.starts_with("virtual_channels="));
            prop_assume!(!line.starts_with("presets="));
            prop_assume!(!line.starts_with("mute "));
            prop_assume!(!line.starts_with("crosspoint_mute "));
            prop_assert_eq!(decode_line(&line), ProtocolEvent::NoOp);
        }
    }
}
