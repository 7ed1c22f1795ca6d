//! Binary traces of finished runs.
//!
//! Layout (little-endian):
//! `magic "F9T1" | version | endianness | board size | steps u32 | start u64 |
//! elapsed f32 | final score u64 | highest value u64 | engine_len u16 |
//! engine bytes | states ((steps + 1) * size² rank bytes) |
//! scores ((steps + 1) * u64) | moves (steps bytes) | crc32c u32`
//!
//! Identity keys are not stored; boards rebuilt from a trace get positional keys.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Direction, EngineError, Rank, Score};

const MAGIC: &[u8; 4] = b"F9T1";
const VERSION: u8 = 1;
const ENDIAN_LE: u8 = 0;
// magic + version + endian + size + steps + start + elapsed + score + highest + engine_len
const HEADER_LEN: usize = 4 + 1 + 1 + 1 + 4 + 8 + 4 + 8 + 8 + 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub board_size: u8,
    pub steps: u32,
    pub start_unix_s: u64,
    pub elapsed_s: f32,
    pub final_score: Score,
    pub highest_value: u64,
    pub engine_str: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub meta: Meta,
    pub states: Vec<Vec<Rank>>, // length = steps + 1, each size * size
    pub scores: Vec<Score>,     // cumulative, length = steps + 1
    pub moves: Vec<u8>,         // Direction::to_u8, length = steps
}

impl Run {
    /// Rebuild every recorded board.
    pub fn boards(&self) -> Result<Vec<Board>, EngineError> {
        let size = self.meta.board_size as usize;
        self.states.iter().map(|ranks| Board::from_ranks(size, ranks)).collect()
    }

    /// Recorded moves; `None` entries mark corrupt codes.
    pub fn directions(&self) -> Vec<Option<Direction>> {
        self.moves.iter().map(|&m| Direction::from_u8(m)).collect()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("unsupported endianness")]
    Endianness,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("inconsistent run: {0}")]
    Inconsistent(&'static str),
}

/// Accumulates a run while it is being played.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    size: usize,
    start_unix_s: u64,
    states: Vec<Vec<Rank>>,
    scores: Vec<Score>,
    moves: Vec<u8>,
}

impl TraceRecorder {
    /// Start recording from `board` with `score` already banked.
    pub fn new(board: &Board, score: Score) -> Self {
        TraceRecorder {
            size: board.size(),
            start_unix_s: now_unix_seconds(),
            states: vec![board.ranks().collect()],
            scores: vec![score],
            moves: Vec::with_capacity(1024),
        }
    }

    /// Record that `dir` led to `board` with cumulative `score`.
    pub fn push(&mut self, dir: Direction, board: &Board, score: Score) {
        self.moves.push(dir.to_u8());
        self.states.push(board.ranks().collect());
        self.scores.push(score);
    }

    #[inline]
    pub fn steps(&self) -> usize { self.moves.len() }

    /// Close the run, deriving the summary fields from the recorded states.
    ///
    /// Fails if the board size or step count does not fit the header fields.
    pub fn finish(self, elapsed_s: f32, engine_str: Option<String>) -> Result<Run, TraceError> {
        let board_size =
            u8::try_from(self.size).map_err(|_| TraceError::Inconsistent("board size does not fit in a u8"))?;
        let steps =
            u32::try_from(self.moves.len()).map_err(|_| TraceError::Inconsistent("step count does not fit in a u32"))?;
        let highest_value = self
            .states
            .iter()
            .flat_map(|ranks| ranks.iter().copied())
            .max()
            .and_then(crate::engine::tile_value)
            .unwrap_or(0);
        let meta = Meta {
            board_size,
            steps,
            start_unix_s: self.start_unix_s,
            elapsed_s,
            final_score: self.scores.last().copied().unwrap_or(0),
            highest_value,
            engine_str,
        };
        Ok(Run { meta, states: self.states, scores: self.scores, moves: self.moves })
    }
}

#[inline]
fn read_u16_le(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < 2 { return None; }
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 4 { return None; }
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(arr))
}

#[inline]
fn read_f32_le(bytes: &[u8]) -> Option<f32> {
    read_u32_le(bytes).map(f32::from_bits)
}

pub fn encode_run(run: &Run) -> Result<Vec<u8>, TraceError> {
    let meta = &run.meta;
    let steps = meta.steps as usize;
    let cells = meta.board_size as usize * meta.board_size as usize;
    if run.states.len() != steps + 1 || run.scores.len() != steps + 1 {
        return Err(TraceError::Inconsistent("states and scores must have steps + 1 entries"));
    }
    if run.moves.len() != steps {
        return Err(TraceError::Inconsistent("moves must have steps entries"));
    }
    if run.states.iter().any(|s| s.len() != cells) {
        return Err(TraceError::Inconsistent("state does not match board size"));
    }

    let engine_bytes = meta.engine_str.as_ref().map(|s| s.as_bytes()).unwrap_or(&[]);
    let engine_len: u16 = engine_bytes
        .len()
        .try_into()
        .map_err(|_| TraceError::Inconsistent("engine_str too long for u16 length"))?;

    let payload_len = engine_bytes.len() + (steps + 1) * (cells + 8) + steps;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload_len + 4);

    // Header
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(ENDIAN_LE);
    buf.push(meta.board_size);
    buf.extend_from_slice(&meta.steps.to_le_bytes());
    buf.extend_from_slice(&meta.start_unix_s.to_le_bytes());
    buf.extend_from_slice(&meta.elapsed_s.to_bits().to_le_bytes());
    buf.extend_from_slice(&meta.final_score.to_le_bytes());
    buf.extend_from_slice(&meta.highest_value.to_le_bytes());
    buf.extend_from_slice(&engine_len.to_le_bytes());
    buf.extend_from_slice(engine_bytes);

    // Payload
    for state in &run.states { buf.extend_from_slice(state); }
    for &score in &run.scores { buf.extend_from_slice(&score.to_le_bytes()); }
    buf.extend_from_slice(&run.moves);

    // Trailer: CRC32C of all preceding bytes
    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn write_run_to_path<P: AsRef<Path>>(path: P, run: &Run) -> Result<(), TraceError> {
    let data = encode_run(run)?;
    let mut f = fs::File::create(path)?;
    f.write_all(&data)?;
    Ok(())
}

pub fn parse_run_bytes(bytes: &[u8]) -> Result<Run, TraceError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(TraceError::Malformed);
    }

    // Validate checksum first to avoid panics while reading fields
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = read_u32_le(trailer).ok_or(TraceError::Malformed)?;
    if file_crc != crc32c::crc32c(content) {
        return Err(TraceError::Checksum);
    }

    if &content[..4] != MAGIC || content[4] != VERSION { return Err(TraceError::MagicOrVersion); }
    if content[5] != ENDIAN_LE { return Err(TraceError::Endianness); }

    let board_size = content[6];
    let mut off = 7;
    let steps = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 4;
    let start_unix_s = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let elapsed_s = read_f32_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 4;
    let final_score = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let highest_value = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let engine_len = read_u16_le(&content[off..]).ok_or(TraceError::Malformed)? as usize; off += 2;

    let engine_bytes = content.get(off..off + engine_len).ok_or(TraceError::Malformed)?;
    off += engine_len;
    let engine_str = if engine_len > 0 { std::str::from_utf8(engine_bytes).ok().map(str::to_string) } else { None };

    let cells = board_size as usize * board_size as usize;
    let count = steps as usize + 1;
    let states_len = count.checked_mul(cells).ok_or(TraceError::Malformed)?;
    let scores_len = count.checked_mul(8).ok_or(TraceError::Malformed)?;
    let moves_len = steps as usize;
    if content.len() != off + states_len + scores_len + moves_len {
        return Err(TraceError::Malformed);
    }

    let states: Vec<Vec<Rank>> = (0..count)
        .map(|i| content[off + i * cells..off + (i + 1) * cells].to_vec())
        .collect();
    off += states_len;

    let scores = content[off..off + scores_len]
        .chunks_exact(8)
        .map(|chunk| read_u64_le(chunk).ok_or(TraceError::Malformed))
        .collect::<Result<Vec<_>, _>>()?;
    off += scores_len;

    let moves = content[off..off + moves_len].to_vec();

    let meta = Meta { board_size, steps, start_unix_s, elapsed_s, final_score, highest_value, engine_str };
    Ok(Run { meta, states, scores, moves })
}

pub fn parse_run_file<P: AsRef<Path>>(path: P) -> Result<Run, TraceError> {
    let data = fs::read(path)?;
    parse_run_bytes(&data)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
