//! 正準文字列上の書き換え規則
//!
//! ここで作られる関係は、表層形の正準文字列を別の表層形の正準文字列へ写す
//! トランスデューサです。[`Lexicon::add_rule`](crate::Lexicon::add_rule) に渡すと、
//! すべての見出しの表層形に適用されます。
//!
//! # 例
//!
//! ```
//! use morpho::{rules, Form, Lexicon, Morpheme, Query};
//!
//! let mut lexicon = Lexicon::new();
//! for (lemma, pos) in [("dog", "N"), ("run", "V")] {
//!     lexicon.add_entry(
//!         &Form::builder()
//!             .lemma_segmentation([lemma])
//!             .lemma_gloss([lemma])
//!             .segmentation([lemma])
//!             .gloss([lemma])
//!             .feature("pos", pos)
//!             .build()?,
//!     )?;
//! }
//!
//! let alphabet = lexicon.alphabet().clone();
//! let plural = rules::suffix(&alphabet, &[Morpheme::new("s", "PL")])?;
//! let nouns = rules::when(&alphabet, &Query::new().feature("pos", "N"))?;
//! lexicon.add_rule(&nouns.then(&plural));
//!
//! let texts: Vec<_> = lexicon.entries()?.iter().map(|f| f.text()).collect();
//! assert_eq!(texts, vec!["dogs", "run"]);
//! # Ok::<(), morpho::errors::MorphoError>(())
//! ```

use std::sync::Arc;

use crate::codec::{self, Morpheme, END, FEATURES_START, MORPHEMES_START, SEPARATOR};
use crate::config::Alphabet;
use crate::errors::Result;
use crate::grammar::Grammar;
use crate::query::Query;
use crate::relation::Relation;

fn check_morphemes(alphabet: &Alphabet, morphemes: &[Morpheme]) -> Result<String> {
    for m in morphemes {
        alphabet.check("segment", &m.segment)?;
        alphabet.check("gloss", &m.gloss)?;
    }
    codec::encode_morphemes(morphemes)
}

fn identity(s: &str) -> Result<Relation> {
    Relation::acceptor(s)
}

fn insertion(s: &str) -> Result<Relation> {
    Relation::from_pair("", s)
}

/// 形態素領域の後に続く `$素性|` をそのまま通す関係
fn features_tail(grammar: &Grammar) -> Result<Relation> {
    Ok(identity(&FEATURES_START.to_string())?
        .concatenate(grammar.region())
        .concatenate(&identity(&END.to_string())?))
}

/// 表層形の末尾に形態素を付け加える規則を作成します。
///
/// # 引数
///
/// * `alphabet` - 形態素に使える文字
/// * `morphemes` - 付け加える形態素列
///
/// # 戻り値
///
/// `^a(A)$...|` を `^a(A) m(M)$...|` に写すトランスデューサ。
/// `morphemes` が空の場合は恒等写像です。
///
/// # エラー
///
/// 予約文字やアルファベット外の文字が含まれる場合、[`MorphoError::Encoding`](crate::errors::MorphoError::Encoding) を返します。
pub fn suffix(alphabet: &Alphabet, morphemes: &[Morpheme]) -> Result<Relation> {
    let tokens = check_morphemes(alphabet, morphemes)?;
    let grammar = Grammar::get(alphabet);
    if morphemes.is_empty() {
        return Ok(grammar.sigma_star().clone());
    }
    let nonempty = grammar.region().difference(&Relation::epsilon());
    let appended = nonempty.concatenate(&insertion(&format!("{SEPARATOR}{tokens}"))?);
    let body = appended.union(&insertion(&tokens)?);
    Ok(identity(&MORPHEMES_START.to_string())?
        .concatenate(&body)
        .concatenate(&features_tail(&grammar)?)
        .optimized())
}

/// 表層形の先頭に形態素を付け加える規則を作成します。
///
/// [`suffix`] と同様ですが、`^a(A)$...|` を `^m(M) a(A)$...|` に写します。
pub fn prefix(alphabet: &Alphabet, morphemes: &[Morpheme]) -> Result<Relation> {
    let tokens = check_morphemes(alphabet, morphemes)?;
    let grammar = Grammar::get(alphabet);
    if morphemes.is_empty() {
        return Ok(grammar.sigma_star().clone());
    }
    let nonempty = grammar.region().difference(&Relation::epsilon());
    let prepended = insertion(&format!("{tokens}{SEPARATOR}"))?.concatenate(&nonempty);
    let body = prepended.union(&insertion(&tokens)?);
    Ok(identity(&MORPHEMES_START.to_string())?
        .concatenate(&body)
        .concatenate(&features_tail(&grammar)?)
        .optimized())
}

/// 問い合わせに一致する表層形だけに規則を適用するための条件
#[derive(Clone)]
pub struct Condition {
    filter: Relation,
    grammar: Arc<Grammar>,
}

impl Condition {
    /// 条件付きの規則を作成します。
    ///
    /// 条件に一致し、かつ `rule` の定義域に含まれる表層形は `rule` で書き換えられ、
    /// それ以外の正準文字列はそのまま残ります。
    pub fn then(&self, rule: &Relation) -> Relation {
        self.filter
            .compose(rule)
            .priority_union(self.grammar.sigma_star())
            .optimized()
    }

    /// 条件を表すアクセプタ
    pub fn filter(&self) -> &Relation {
        &self.filter
    }
}

/// 表層形に対する問い合わせから条件を作成します。
///
/// 問い合わせの見出し形側の指定は使われません。
///
/// # エラー
///
/// 問い合わせに予約文字やアルファベット外の文字が含まれる場合、[`MorphoError::Encoding`](crate::errors::MorphoError::Encoding) を返します。
pub fn when(alphabet: &Alphabet, query: &Query) -> Result<Condition> {
    let grammar = Grammar::get(alphabet);
    Ok(Condition {
        filter: query.bottom(&grammar)?,
        grammar,
    })
}
