//! Character vocabulary in fairseq `dict.<lang>.txt` format
//!
//! Each line holds `<symbol> <count>` with an optional trailing flag. The four
//! special symbols are implicit and always occupy the first ids.

use std::collections::HashMap;
use std::path::Path;

use gu_xlit_core::{Error, Language, Result};

pub const BOS: &str = "<s>";
pub const PAD: &str = "<pad>";
pub const EOS: &str = "</s>";
pub const UNK: &str = "<unk>";

#[derive(Debug, Clone)]
pub struct Dictionary {
    symbols: Vec<String>,
    indices: HashMap<String, i64>,
}

impl Dictionary {
    pub fn parse(contents: &str) -> Result<Self> {
        let mut dict = Self::empty();

        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let symbol = fields.next().unwrap_or_default();
            let count = fields.next().ok_or_else(|| {
                Error::Model(format!("dictionary line {}: missing count", line_no + 1))
            })?;
            count.parse::<u64>().map_err(|_| {
                Error::Model(format!(
                    "dictionary line {}: bad count '{}'",
                    line_no + 1,
                    count
                ))
            })?;
            dict.add(symbol);
        }

        Ok(dict)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!("Failed to read dictionary {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    fn empty() -> Self {
        let mut dict = Self {
            symbols: Vec::new(),
            indices: HashMap::new(),
        };
        for special in [BOS, PAD, EOS, UNK] {
            dict.add(special);
        }
        dict
    }

    fn add(&mut self, symbol: &str) {
        if self.indices.contains_key(symbol) {
            return;
        }
        self.indices
            .insert(symbol.to_string(), self.symbols.len() as i64);
        self.symbols.push(symbol.to_string());
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index(&self, symbol: &str) -> i64 {
        self.indices
            .get(symbol)
            .copied()
            .unwrap_or_else(|| self.unk())
    }

    pub fn bos(&self) -> i64 {
        0
    }

    pub fn pad(&self) -> i64 {
        1
    }

    pub fn eos(&self) -> i64 {
        2
    }

    pub fn unk(&self) -> i64 {
        3
    }

    /// Source ids for one word: optional `__<lang>__` tag, one id per
    /// lowercased character, then `</s>`
    pub fn encode_word(&self, word: &str, language: Language) -> Vec<i64> {
        let tag = format!("__{}__", language.code());
        let mut ids = Vec::with_capacity(word.chars().count() + 2);
        if let Some(&id) = self.indices.get(&tag) {
            ids.push(id);
        }
        for c in word.to_lowercase().chars() {
            let mut buf = [0u8; 4];
            ids.push(self.index(c.encode_utf8(&mut buf)));
        }
        ids.push(self.eos());
        ids
    }

    /// Concatenate symbols, dropping specials and language tags
    pub fn decode(&self, ids: &[i64]) -> String {
        ids.iter()
            .filter(|&&id| id > self.unk())
            .filter_map(|&id| self.symbols.get(id as usize))
            .filter(|s| !(s.starts_with("__") && s.ends_with("__")))
            .map(String::as_str)
            .collect()
    }
}
