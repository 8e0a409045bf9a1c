//! アルファベットの設定
//!
//! セグメント・グロス・素性のキーと値に使用できる文字の集合を定義します。
//! レキシコンとクエリは同じアルファベットの上で構築される必要があります。

use std::collections::BTreeSet;
use std::fmt;

use crate::codec::RESERVED;
use crate::errors::{MorphoError, Result};

/// フィールドに使用できる文字の集合
///
/// 文字は順序付きで重複なく保持されるため、同じ文字からなるアルファベットは
/// 構築順によらず等しくなります。
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Alphabet {
    chars: BTreeSet<char>,
}

impl Alphabet {
    /// 文字の集合からアルファベットを作成します。
    ///
    /// # エラー
    ///
    /// 予約された区切り文字（`^ $ | ( )`、空白、`\0`）が含まれている場合、
    /// [`MorphoError::InvalidArgument`] を返します。
    pub fn new<I>(chars: I) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        let chars: BTreeSet<char> = chars.into_iter().collect();
        if let Some(c) = chars.iter().find(|c| RESERVED.contains(c)) {
            return Err(MorphoError::invalid_argument(
                "chars",
                format!("{c:?} is a reserved delimiter"),
            ));
        }
        if chars.is_empty() {
            return Err(MorphoError::invalid_argument("chars", "the alphabet is empty"));
        }
        Ok(Self { chars })
    }

    /// 印字可能なASCII文字から予約文字を除いたアルファベット
    pub fn printable() -> Self {
        Self {
            chars: (' '..='~').filter(|c| !RESERVED.contains(c)).collect(),
        }
    }

    /// 文字を追加したアルファベットを返します。
    ///
    /// # エラー
    ///
    /// 予約文字が含まれている場合、[`MorphoError::InvalidArgument`] を返します。
    pub fn with_chars<I>(mut self, chars: I) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        for c in chars {
            if RESERVED.contains(&c) {
                return Err(MorphoError::invalid_argument(
                    "chars",
                    format!("{c:?} is a reserved delimiter"),
                ));
            }
            self.chars.insert(c);
        }
        Ok(self)
    }

    #[inline(always)]
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// すべての文字がアルファベットに含まれているか検査します。
    ///
    /// # 引数
    ///
    /// * `arg` - エラーメッセージに使用するフィールド名
    /// * `s` - 検査する文字列
    ///
    /// # エラー
    ///
    /// アルファベット外の文字が含まれている場合、[`MorphoError::Encoding`] を返します。
    pub fn check(&self, arg: &'static str, s: &str) -> Result<()> {
        match s.chars().find(|&c| !self.contains(c)) {
            Some(c) => Err(MorphoError::encoding(
                arg,
                format!("{s:?} contains {c:?}, which is outside the alphabet"),
            )),
            None => Ok(()),
        }
    }

    /// 文字列をそのまま保存できる形式に変換します。
    pub(crate) fn to_string_lossless(&self) -> String {
        self.chars.iter().collect()
    }
}

impl Default for Alphabet {
    /// ASCIIの英字・数字・アポストロフィ・ハイフン
    fn default() -> Self {
        Self {
            chars: ('a'..='z')
                .chain('A'..='Z')
                .chain('0'..='9')
                .chain(['\'', '-'])
                .collect(),
        }
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Alphabet({:?})", self.to_string_lossless())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet() {
        let a = Alphabet::default();
        assert!(a.contains('x'));
        assert!(a.contains('Q'));
        assert!(a.contains('7'));
        assert!(a.contains('-'));
        assert!(!a.contains(' '));
        assert_eq!(a.len(), 26 * 2 + 10 + 2);
    }

    #[test]
    fn test_reserved_rejected() {
        assert!(Alphabet::new("ab$".chars()).unwrap_err().is_invalid_argument());
        assert!(Alphabet::default()
            .with_chars([' '])
            .unwrap_err()
            .is_invalid_argument());
        assert!(Alphabet::new([]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_with_chars() {
        let a = Alphabet::default().with_chars("äö".chars()).unwrap();
        assert!(a.check("segment", "häuser").is_ok());
        assert!(Alphabet::default().check("segment", "häuser").unwrap_err().is_encoding());
    }

    #[test]
    fn test_printable_excludes_reserved() {
        let a = Alphabet::printable();
        for c in RESERVED {
            assert!(!a.contains(c));
        }
        assert!(a.contains('~'));
        assert!(a.contains('.'));
    }

    #[test]
    fn test_order_independent_equality() {
        assert_eq!(
            Alphabet::new("abc".chars()).unwrap(),
            Alphabet::new("cab".chars()).unwrap()
        );
    }
}
