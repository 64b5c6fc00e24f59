//! PGN import and export.
//!
//! Import reads the mainline only: comments, variations, move numbers, NAGs
//! and result tokens are stripped and the remaining tokens are replayed as
//! SAN. Export writes the path from the root to the cursor.

use crate::tree::{GameResult, GameTree};
use crate::{PgnError, TreeError};
use chess_core::{FenFields, Variant, SEVEN_TAG_ROSTER};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[([^ ]+) "([^"]*)"\]"#).expect("valid regex"));

static MOVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.+").expect("valid regex"));

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?!]+").expect("valid regex"));

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Init,
    Head,
    Body,
}

/// Splits a multi-game PGN text into one string per game.
///
/// A game is a run of header lines followed by movetext, and ends at the
/// first blank line after its movetext. Each returned game is its header
/// lines, a blank line, then its movetext lines. Two blank lines are read
/// after the text so that a final game without movetext is still emitted.
pub fn split_pgn(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut state = SplitState::Init;
    let mut head: Vec<&str> = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines().chain(["", ""]) {
        let line = line.trim_end_matches('\r');
        let blank = line.trim().is_empty();
        match state {
            SplitState::Init => {
                if blank {
                    continue;
                }
                if line.starts_with('[') {
                    head.push(line);
                    state = SplitState::Head;
                } else {
                    body.push(line);
                    state = SplitState::Body;
                }
            }
            SplitState::Head => {
                if line.starts_with('[') {
                    head.push(line);
                } else {
                    if !blank {
                        body.push(line);
                    }
                    state = SplitState::Body;
                }
            }
            SplitState::Body => {
                if !blank {
                    body.push(line);
                    continue;
                }
                state = SplitState::Init;
                if head.is_empty() && body.is_empty() {
                    continue;
                }
                let game = format!("{}\n\n{}", head.join("\n"), body.join("\n"));
                debug!(headers = head.len(), body = game.len(), "split pgn game");
                games.push(game);
                head.clear();
                body.clear();
            }
        }
    }
    games
}

/// Removes variations, comments, move numbers, NAGs and results from
/// movetext, returning the SAN tokens of the mainline.
pub fn movetext_sans(movetext: &str) -> Vec<String> {
    let mut stripped = String::with_capacity(movetext.len());
    let mut depth = 0usize;
    let mut chars = movetext.chars();
    while let Some(c) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '{' => {
                // Brace comments do not nest.
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
                stripped.push(' ');
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                stripped.push(' ');
            }
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }

    stripped
        .split_whitespace()
        .filter(|token| !RESULT_TOKENS.contains(token) && !token.starts_with('$'))
        .map(|token| {
            let token = MOVE_NUMBER.replace(token, "");
            let token = ANNOTATION.replace_all(&token, "");
            normalize_castling(&token)
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn normalize_castling(token: &str) -> String {
    if token.starts_with("0-0") {
        token.replace('0', "O")
    } else {
        token.to_string()
    }
}

/// Separates the tag pairs of one game from its movetext.
fn parse_headers(pgn: &str) -> (BTreeMap<String, String>, String) {
    let mut headers = BTreeMap::new();
    let mut body = String::new();
    for line in pgn.lines() {
        match HEADER.captures(line.trim()) {
            Some(caps) => {
                headers.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => {
                body.push_str(line);
                body.push('\n');
            }
        }
    }
    (headers, body)
}

impl GameTree {
    /// Replaces the tree with the first game of a PGN text.
    ///
    /// The `Variant` and `FEN` tags select the rules and start position; a
    /// game without a `Variant` tag is standard chess. Moves that cannot be
    /// played are skipped.
    pub fn parse_pgn(&mut self, text: &str) -> Result<(), PgnError> {
        self.parse_pgn_with_variant(text, Variant::Standard)
    }

    /// Like [`GameTree::parse_pgn`], but a game without a `Variant` tag is
    /// read as `fallback`.
    pub fn parse_pgn_with_variant(&mut self, text: &str, fallback: Variant) -> Result<(), PgnError> {
        let games = split_pgn(text);
        let Some(pgn) = games.first() else {
            error!("could not parse empty pgn");
            return Err(PgnError::Empty);
        };

        let (headers, body) = parse_headers(pgn);
        let variant = headers
            .get("Variant")
            .filter(|name| !name.trim().is_empty())
            .map_or(fallback, |name| Variant::guess(name));
        let fen = headers.get("FEN").filter(|fen| !fen.is_empty());
        self.set_variant(variant, fen.map(String::as_str));
        self.result = GameResult::from_pgn(headers.get("Result").map_or("", String::as_str));
        self.headers = headers;

        let sans = movetext_sans(&body);
        let mut played = 0;
        for san in &sans {
            match self.play_san(san) {
                Ok(()) => played += 1,
                Err(TreeError::Position(e)) if e.is_illegal() => {
                    warn!(san = %san, error = %e, "skipping illegal pgn move")
                }
                Err(e) => warn!(san = %san, error = %e, "skipping unreadable pgn token"),
            }
        }
        debug!(variant = %variant, played, skipped = sans.len() - played, "parsed pgn");
        Ok(())
    }

    /// Replays the mainline of another tree from this tree's root.
    ///
    /// The other tree is not changed. Moves that are illegal here are
    /// skipped. Returns the number of moves played.
    pub fn merge_game(&mut self, other: &GameTree) -> usize {
        self.to_begin();
        let mut played = 0;
        for san in other.main_line().iter().filter_map(|node| node.gen_san()) {
            match self.play_san(san) {
                Ok(()) => played += 1,
                Err(e) => warn!(san = %san, error = %e, "skipping merged move"),
            }
        }
        played
    }

    /// Merges the mainline of every game in a PGN text into this tree.
    ///
    /// Games without a `Variant` tag are read in this tree's variant.
    /// Returns the number of games merged.
    pub fn merge_pgn(&mut self, text: &str) -> Result<usize, PgnError> {
        let games = split_pgn(text);
        if games.is_empty() {
            error!("could not merge empty pgn");
            return Err(PgnError::Empty);
        }
        for pgn in &games {
            let mut game = GameTree::with_variant(self.variant, None);
            game.parse_pgn_with_variant(pgn, self.variant)?;
            let played = self.merge_game(&game);
            debug!(played, "merged pgn game");
        }
        info!(games = games.len(), "merged pgn");
        Ok(games.len())
    }

    /// Formats the PGN tag pairs.
    ///
    /// The seven-tag roster comes first, with `?` for missing values, then
    /// the remaining tags in alphabetical order. `Variant` and `FEN`
    /// always describe the tree itself.
    pub fn report_headers(&self) -> String {
        let mut headers = self.headers.clone();
        headers.insert("Variant".to_string(), self.variant.display_name().to_string());
        headers.insert("FEN".to_string(), self.root().fen().to_string());

        let tag = |name: &str| {
            let value = headers.get(name).filter(|v| !v.is_empty()).map_or("?", String::as_str);
            format!("[{} \"{}\"]", name, value)
        };

        let mut lines: Vec<String> = SEVEN_TAG_ROSTER.iter().map(|name| tag(*name)).collect();
        lines.extend(
            headers
                .keys()
                .filter(|name| !SEVEN_TAG_ROSTER.contains(&name.as_str()))
                .map(|name| tag(name.as_str())),
        );
        lines.join("\n")
    }

    /// Formats the moves from the root to the cursor as PGN movetext,
    /// optionally preceded by the tag pairs.
    pub fn report_pgn(&self, with_headers: bool) -> String {
        let (black_first, first_move) = match FenFields::parse(self.root().fen()) {
            Ok(fields) => (fields.black_to_move(), fields.fullmove_number.max(1)),
            Err(_) => (false, 1),
        };

        let mut tokens: Vec<String> = Vec::new();
        for (i, san) in self.path_sans(self.current().id()).into_iter().enumerate() {
            // Half-moves counted from white's move of `first_move`.
            let ply = i + usize::from(black_first);
            let number = first_move as usize + ply / 2;
            if i == 0 && black_first {
                tokens.push(format!("{}...", number));
            } else if ply % 2 == 0 {
                tokens.push(format!("{}.", number));
            }
            tokens.push(san.to_string());
        }
        let movetext = tokens.join(" ");

        if with_headers {
            format!("{}\n\n{}", self.report_headers(), movetext)
        } else {
            movetext
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GAMES: &str = r#"[Event "First"]
[White "A"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 1-0

[Event "Second"]
[White "B"]

1. d4 d5 0-1
"#;

    #[test]
    fn split_two_games() {
        let games = split_pgn(TWO_GAMES);
        assert_eq!(games.len(), 2);
        assert_eq!(
            games[0],
            "[Event \"First\"]\n[White \"A\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Nf3 Nc6 1-0"
        );
        assert!(games[1].ends_with("1. d4 d5 0-1"));
    }

    #[test]
    fn split_without_headers() {
        let games = split_pgn("1. e4 e5\n2. Nf3\n");
        assert_eq!(games, vec!["\n\n1. e4 e5\n2. Nf3".to_string()]);
    }

    #[test]
    fn split_ignores_blank_runs() {
        assert!(split_pgn("").is_empty());
        assert!(split_pgn("\n\n\r\n").is_empty());
        let games = split_pgn("\n\n1. e4\n\n\n\n1. d4\n");
        assert_eq!(games.len(), 2);
    }

    #[test]
    fn split_keeps_movetext_after_headers() {
        let games = split_pgn("[Event \"x\"]\n1. e4 e5\n");
        assert_eq!(games, vec!["[Event \"x\"]\n\n1. e4 e5".to_string()]);
    }

    #[test]
    fn split_handles_crlf() {
        let games = split_pgn("[Event \"x\"]\r\n\r\n1. e4\r\n\r\n");
        assert_eq!(games, vec!["[Event \"x\"]\n\n1. e4".to_string()]);
    }

    #[test]
    fn split_flushes_trailing_headers_only_game() {
        let text = "[Event \"x\"]\n[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]";
        let games = split_pgn(text);
        assert_eq!(
            games,
            vec!["[Event \"x\"]\n[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]\n\n".to_string()]
        );
    }

    #[test]
    fn parse_headers_only_game_sets_start() {
        let mut tree = GameTree::new();
        tree.parse_pgn("[Event \"setup\"]\n[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]")
            .unwrap();
        assert_eq!(tree.root().fen(), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(tree.current().is_root());
        assert_eq!(tree.header("Event", "?"), "setup");
    }

    #[test]
    fn movetext_strips_noise() {
        let sans = movetext_sans("1. e4 {best by test} e5 2. Nf3!? $1 Nc6?? 3. Bb5 1/2-1/2");
        assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
    }

    #[test]
    fn movetext_strips_nested_variations() {
        let sans = movetext_sans("1. e4 (1. d4 d5 (1... Nf6 2. c4 (2. Nf3))) 1... c5 *");
        assert_eq!(sans, vec!["e4", "c5"]);
    }

    #[test]
    fn movetext_line_comments_and_numbers() {
        let sans = movetext_sans("1.e4 ; king's pawn\n1...e5 2.O-O");
        assert_eq!(sans, vec!["e4", "e5", "O-O"]);
        assert_eq!(movetext_sans("5. 0-0-0"), vec!["O-O-O"]);
    }

    #[test]
    fn parse_sets_headers_and_result() {
        let mut tree = GameTree::new();
        tree.parse_pgn(TWO_GAMES).unwrap();
        assert_eq!(tree.current().id(), "*_e4_e5_Nf3_Nc6");
        assert_eq!(tree.header("Event", "?"), "First");
        assert_eq!(tree.header("White", "?"), "A");
        assert_eq!(tree.result(), GameResult::WhiteWins);
    }

    #[test]
    fn parse_skips_illegal_moves() {
        let mut tree = GameTree::new();
        tree.parse_pgn("1. e4 Ke2 e5").unwrap();
        assert_eq!(tree.current().id(), "*_e4_e5");
    }

    #[test]
    fn untagged_game_is_standard_chess() {
        let mut tree = GameTree::with_variant(Variant::Antichess, None);
        tree.parse_pgn("1. e4 d5 2. Nc3").unwrap();
        assert_eq!(tree.variant(), Variant::Standard);
        assert_eq!(tree.current().id(), "*_e4_d5_Nc3");
    }

    #[test]
    fn untagged_game_uses_fallback_variant() {
        let mut tree = GameTree::new();
        tree.parse_pgn_with_variant("1. e3 b5 2. Bxb5", Variant::Antichess)
            .unwrap();
        assert_eq!(tree.variant(), Variant::Antichess);
        assert_eq!(tree.current().id(), "*_e3_b5_Bxb5");

        tree.parse_pgn_with_variant("[Variant \"Standard\"]\n\n1. e4 d5 2. Nc3", Variant::Antichess)
            .unwrap();
        assert_eq!(tree.variant(), Variant::Standard);
        assert_eq!(tree.current().id(), "*_e4_d5_Nc3");
    }

    #[test]
    fn parse_empty_is_error() {
        let mut tree = GameTree::new();
        tree.play_san("e4").unwrap();
        assert_eq!(tree.parse_pgn("  \n"), Err(PgnError::Empty));
        assert_eq!(tree.current().id(), "*_e4");
    }

    #[test]
    fn parse_variant_and_fen() {
        let pgn = "[Variant \"Three-check\"]\n[FEN \"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 3+3 0 1\"]\n\n1... e5 2. Nf3";
        let mut tree = GameTree::new();
        tree.parse_pgn(pgn).unwrap();
        assert_eq!(tree.variant(), Variant::ThreeCheck);
        assert_eq!(tree.current().id(), "*_e5_Nf3");
        assert_eq!(tree.header("Variant", "?"), "Three-check");
    }

    #[test]
    fn report_movetext() {
        let mut tree = GameTree::new();
        tree.play_sans_str("e4 e5 Nf3");
        assert_eq!(tree.report_pgn(false), "1. e4 e5 2. Nf3");
        tree.back();
        assert_eq!(tree.report_pgn(false), "1. e4 e5");
        tree.to_begin();
        assert_eq!(tree.report_pgn(false), "");
    }

    #[test]
    fn report_black_to_move_start() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let mut tree = GameTree::with_variant(Variant::Standard, Some(fen));
        tree.play_sans_str("e5 Nf3 Nc6");
        assert_eq!(tree.report_pgn(false), "1... e5 2. Nf3 Nc6");
    }

    #[test]
    fn report_later_start() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 30";
        let mut tree = GameTree::with_variant(Variant::Standard, Some(fen));
        tree.play_sans_str("e4 Kd7 e5");
        assert_eq!(tree.report_pgn(false), "30. e4 Kd7 31. e5");
    }

    #[test]
    fn report_headers_order() {
        let mut tree = GameTree::with_variant(Variant::Atomic, None);
        tree.set_header("White", "Alice");
        tree.set_header("Annotator", "Carol");
        tree.set_header("Variant", "stale");
        let headers = tree.report_headers();
        let lines: Vec<&str> = headers.lines().collect();
        assert_eq!(lines[0], "[Event \"?\"]");
        assert_eq!(lines[4], "[White \"Alice\"]");
        assert_eq!(lines[6], "[Result \"?\"]");
        assert_eq!(lines[7], "[Annotator \"Carol\"]");
        assert_eq!(lines[8], format!("[FEN \"{}\"]", tree.root().fen()));
        assert_eq!(lines[9], "[Variant \"Atomic\"]");
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn report_with_headers() {
        let mut tree = GameTree::new();
        tree.play_san("d4").unwrap();
        let pgn = tree.report_pgn(true);
        assert!(pgn.starts_with("[Event \"?\"]"));
        assert!(pgn.ends_with("\n\n1. d4"));
    }

    #[test]
    fn merge_folds_in_variations() {
        let mut tree = GameTree::new();
        tree.parse_pgn("1. e4 e5 2. Nf3").unwrap();
        let merged = tree.merge_pgn("1. e4 c5\n\n1. d4 d5\n").unwrap();
        assert_eq!(merged, 2);
        assert!(tree.contains("*_e4_e5_Nf3"));
        assert!(tree.contains("*_e4_c5"));
        assert!(tree.contains("*_d4_d5"));
        assert_eq!(tree.current().id(), "*_d4_d5");
        assert_eq!(tree.child_nodes().len(), 0);

        tree.to_begin();
        let first: Vec<&str> = tree.child_nodes().iter().map(|n| n.id()).collect();
        assert_eq!(first, vec!["*_d4", "*_e4"]);
    }

    #[test]
    fn merge_game_leaves_source_untouched() {
        let mut source = GameTree::new();
        source.play_sans_str("c4 e5");
        source.back();
        let mut tree = GameTree::new();
        assert_eq!(tree.merge_game(&source), 2);
        assert_eq!(source.current().id(), "*_c4");
        assert_eq!(tree.current().id(), "*_c4_e5");
    }

    #[test]
    fn merge_reads_untagged_games_in_tree_variant() {
        let mut tree = GameTree::with_variant(Variant::Atomic, None);
        assert_eq!(tree.merge_pgn("1. Nf3 f6 2. Ng5").unwrap(), 1);
        assert_eq!(tree.variant(), Variant::Atomic);
        assert!(tree.contains("*_Nf3_f6_Ng5"));
    }

    #[test]
    fn merge_empty_is_error() {
        let mut tree = GameTree::new();
        assert_eq!(tree.merge_pgn(""), Err(PgnError::Empty));
    }
}
