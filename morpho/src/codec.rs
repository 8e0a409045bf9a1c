//! 形態素解析結果と正準文字列の相互変換
//!
//! 解析結果（形態素列と素性）は次の形式の正準文字列に符号化されます。
//!
//! ```text
//! ^seg1(gloss1) seg2(gloss2)$key1(value1) key2(value2)|
//! ```
//!
//! 素性はキーの辞書順に並べられるため、同じ素性を持つ解析結果は
//! 挿入順によらず同じ文字列になります。
//!
//! # 例
//!
//! ```
//! use morpho::codec::{self, Analysis, Morpheme};
//!
//! let morphemes = vec![Morpheme::new("run", "run"), Morpheme::new("s", "3SG")];
//! let features = [("pos".to_string(), "V".to_string())].into_iter().collect();
//! let s = codec::encode(&morphemes, &features)?;
//! assert_eq!(s, "^run(run) s(3SG)$pos(V)|");
//!
//! let analysis: Analysis = s.parse()?;
//! assert_eq!(analysis.morphemes, morphemes);
//! assert_eq!(analysis.get("pos"), Some("V"));
//! # Ok::<(), morpho::errors::MorphoError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::errors::{MorphoError, Result};

/// 形態素領域の開始記号
pub const MORPHEMES_START: char = '^';
/// 素性領域の開始記号
pub const FEATURES_START: char = '$';
/// 終端記号
pub const END: char = '|';
/// トークンの値の開始記号
pub const VALUE_OPEN: char = '(';
/// トークンの値の終了記号
pub const VALUE_CLOSE: char = ')';
/// トークンの区切り
pub const SEPARATOR: char = ' ';

/// フィールド内に現れてはならない文字
///
/// `\0` は有限状態エンジンのイプシロンとして予約されています。
pub const RESERVED: [char; 7] = [
    MORPHEMES_START,
    FEATURES_START,
    END,
    VALUE_OPEN,
    VALUE_CLOSE,
    SEPARATOR,
    '\0',
];

/// 素性の対応表。キーの辞書順に保持されます。
pub type FeatureMap = BTreeMap<String, String>;

/// 形態素（セグメントとグロスの組）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Morpheme {
    /// 表層の断片
    pub segment: String,
    /// 断片の意味・機能を表すラベル
    pub gloss: String,
}

impl Morpheme {
    pub fn new<S, G>(segment: S, gloss: G) -> Self
    where
        S: Into<String>,
        G: Into<String>,
    {
        Self {
            segment: segment.into(),
            gloss: gloss.into(),
        }
    }
}

/// 解析結果: 形態素列と素性
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Analysis {
    pub morphemes: Vec<Morpheme>,
    pub features: FeatureMap,
}

impl Analysis {
    pub fn new(morphemes: Vec<Morpheme>, features: FeatureMap) -> Self {
        Self {
            morphemes,
            features,
        }
    }

    /// 素性の値を返します。
    pub fn get(&self, key: &str) -> Option<&str> {
        self.features.get(key).map(String::as_str)
    }

    /// セグメントの列
    pub fn segmentation(&self) -> Vec<&str> {
        self.morphemes.iter().map(|m| m.segment.as_str()).collect()
    }

    /// グロスの列
    pub fn gloss(&self) -> Vec<&str> {
        self.morphemes.iter().map(|m| m.gloss.as_str()).collect()
    }

    /// 正準文字列に符号化します。
    pub fn encode(&self) -> Result<String> {
        encode(&self.morphemes, &self.features)
    }
}

impl FromStr for Analysis {
    type Err = MorphoError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// 予約文字が含まれていないか検査します。
pub(crate) fn validate(arg: &'static str, s: &str) -> Result<()> {
    match s.chars().find(|c| RESERVED.contains(c)) {
        Some(c) => Err(MorphoError::encoding(
            arg,
            format!("{s:?} contains the reserved character {c:?}"),
        )),
        None => Ok(()),
    }
}

fn write_tokens<'a, I>(buf: &mut String, tokens: I)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    for (i, (name, value)) in tokens.into_iter().enumerate() {
        if i != 0 {
            buf.push(SEPARATOR);
        }
        // String への書き込みは失敗しない
        let _ = write!(buf, "{name}{VALUE_OPEN}{value}{VALUE_CLOSE}");
    }
}

/// 形態素列を `seg(gloss)` トークンの空白区切りに符号化します。
///
/// # エラー
///
/// セグメントかグロスに予約文字が含まれる場合、[`MorphoError::Encoding`] を返します。
pub fn encode_morphemes(morphemes: &[Morpheme]) -> Result<String> {
    for m in morphemes {
        validate("segment", &m.segment)?;
        validate("gloss", &m.gloss)?;
    }
    let mut buf = String::new();
    write_tokens(
        &mut buf,
        morphemes.iter().map(|m| (m.segment.as_str(), m.gloss.as_str())),
    );
    Ok(buf)
}

/// 素性を `key(value)` トークンの空白区切りに、キーの辞書順で符号化します。
///
/// # エラー
///
/// キーか値に予約文字が含まれる場合、[`MorphoError::Encoding`] を返します。
pub fn encode_features(features: &FeatureMap) -> Result<String> {
    for (key, value) in features {
        validate("feature key", key)?;
        validate("feature value", value)?;
    }
    let mut buf = String::new();
    write_tokens(
        &mut buf,
        features.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    Ok(buf)
}

/// 形態素列と素性を正準文字列に符号化します。
///
/// # 引数
///
/// * `morphemes` - 形態素列
/// * `features` - 素性
///
/// # 戻り値
///
/// `"^" + 形態素トークン + "$" + 素性トークン + "|"`
///
/// # エラー
///
/// いずれかのフィールドに予約文字が含まれる場合、[`MorphoError::Encoding`] を返します。
pub fn encode(morphemes: &[Morpheme], features: &FeatureMap) -> Result<String> {
    let morphemes = encode_morphemes(morphemes)?;
    let features = encode_features(features)?;
    Ok(format!("{MORPHEMES_START}{morphemes}{FEATURES_START}{features}{END}"))
}

/// 検査済みのフィールドを正準文字列に書き出します。
pub(crate) fn write_canonical(morphemes: &[Morpheme], features: &FeatureMap) -> String {
    let mut buf = String::new();
    buf.push(MORPHEMES_START);
    write_tokens(
        &mut buf,
        morphemes.iter().map(|m| (m.segment.as_str(), m.gloss.as_str())),
    );
    buf.push(FEATURES_START);
    write_tokens(
        &mut buf,
        features.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    buf.push(END);
    buf
}

fn parse_tokens<'a>(input: &str, region: &'a str) -> Result<Vec<(&'a str, &'a str)>> {
    if region.is_empty() {
        return Ok(vec![]);
    }
    region
        .split(SEPARATOR)
        .map(|token| {
            let inner = token
                .strip_suffix(VALUE_CLOSE)
                .ok_or_else(|| MorphoError::decode(input, format!("token {token:?} is not closed")))?;
            let (name, value) = inner
                .split_once(VALUE_OPEN)
                .ok_or_else(|| MorphoError::decode(input, format!("token {token:?} is not opened")))?;
            if name.contains([VALUE_OPEN, VALUE_CLOSE]) || value.contains([VALUE_OPEN, VALUE_CLOSE]) {
                return Err(MorphoError::decode(
                    input,
                    format!("token {token:?} has mismatched parentheses"),
                ));
            }
            Ok((name, value))
        })
        .collect()
}

/// 正準文字列を解析結果に復号します。
///
/// # エラー
///
/// 文字列が正準文字列の文法に従っていない場合、[`MorphoError::Decode`] を返します。
pub fn decode(s: &str) -> Result<Analysis> {
    let body = s
        .strip_prefix(MORPHEMES_START)
        .ok_or_else(|| MorphoError::decode(s, format!("missing leading {MORPHEMES_START:?}")))?;
    let body = body
        .strip_suffix(END)
        .ok_or_else(|| MorphoError::decode(s, format!("missing trailing {END:?}")))?;
    let (morphemes, features) = body
        .split_once(FEATURES_START)
        .ok_or_else(|| MorphoError::decode(s, format!("missing {FEATURES_START:?}")))?;
    if features.contains(FEATURES_START) {
        return Err(MorphoError::decode(
            s,
            format!("more than one {FEATURES_START:?}"),
        ));
    }
    if morphemes.contains([MORPHEMES_START, END]) || features.contains([MORPHEMES_START, END]) {
        return Err(MorphoError::decode(s, "misplaced delimiter"));
    }

    let morphemes = parse_tokens(s, morphemes)?
        .into_iter()
        .map(|(segment, gloss)| Morpheme::new(segment, gloss))
        .collect();
    let mut map = FeatureMap::new();
    for (key, value) in parse_tokens(s, features)? {
        if map.insert(key.to_string(), value.to_string()).is_some() {
            return Err(MorphoError::decode(s, format!("duplicate feature {key:?}")));
        }
    }
    Ok(Analysis::new(morphemes, map))
}
