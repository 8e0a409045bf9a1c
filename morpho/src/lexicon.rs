//! 見出し形と表層形の関係を保持するレキシコン
//!
//! [`Lexicon`] は、見出し形の正準文字列（上側）から表層形の正準文字列（下側）への
//! 1つの関係を保持します。見出しの追加は和、規則の適用は合成として行われます。

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use rkyv::{Archive, Deserialize, Serialize};

use crate::config::Alphabet;
use crate::errors::{MorphoError, Result};
use crate::form::Form;
use crate::fst::Fst;
use crate::grammar::Grammar;
use crate::query::Query;
use crate::relation::Relation;
use crate::utils;

/// 直列化されたレキシコンのマジックナンバー
pub const LEXICON_MAGIC: &[u8] = b"MorphoLexicon 0.1\n";

/// 表示の際に巡回するレキシコンから列挙する見出しの数
const DISPLAY_LIMIT: usize = 10;

#[derive(Archive, Serialize, Deserialize)]
struct LexiconData {
    alphabet: String,
    fst: Fst,
}

/// 形態論的レキシコン
///
/// 同じ見出しを異なる順序で追加したレキシコンは等しくなります。
/// 同じレキシコンを複数のスレッドから同時に変更する場合は、呼び出し側で排他制御してください。
///
/// # 例
///
/// ```
/// use morpho::{rules, Form, Lexicon, Morpheme, Query};
///
/// let mut lexicon = Lexicon::new();
/// lexicon.add_entry(
///     &Form::builder()
///         .lemma_segmentation(["walk"])
///         .lemma_gloss(["walk"])
///         .segmentation(["walk"])
///         .gloss(["walk"])
///         .build()?,
/// )?;
/// lexicon.add_rule(&rules::suffix(lexicon.alphabet(), &[Morpheme::new("-ed", "PAST")])?);
///
/// let forms = lexicon.query(&Query::new().lemma_segmentation(["walk"]))?;
/// assert_eq!(forms.len(), 1);
/// assert_eq!(forms[0].text(), "walked");
/// # Ok::<(), morpho::errors::MorphoError>(())
/// ```
#[derive(Clone)]
pub struct Lexicon {
    relation: Relation,
    alphabet: Alphabet,
}

impl Lexicon {
    /// 既定のアルファベットで空のレキシコンを作成します。
    pub fn new() -> Self {
        Self::with_alphabet(Alphabet::default())
    }

    /// アルファベットを指定して空のレキシコンを作成します。
    pub fn with_alphabet(alphabet: Alphabet) -> Self {
        Self {
            relation: Relation::empty(),
            alphabet,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// 内部の関係
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// このレキシコンのアルファベットに対応する文法
    pub fn grammar(&self) -> Arc<Grammar> {
        Grammar::get(&self.alphabet)
    }

    fn check_form(&self, form: &Form) -> Result<()> {
        for m in form.lemma_morphemes().iter().chain(form.morphemes()) {
            self.alphabet.check("segment", &m.segment)?;
            self.alphabet.check("gloss", &m.gloss)?;
        }
        for (key, value) in form.features() {
            self.alphabet.check("feature key", key)?;
            self.alphabet.check("feature value", value)?;
        }
        Ok(())
    }

    /// 見出しを追加します。
    ///
    /// # エラー
    ///
    /// アルファベット外の文字が含まれる場合、[`MorphoError::Encoding`] を返します。
    pub fn add_entry(&mut self, form: &Form) -> Result<()> {
        self.check_form(form)?;
        self.relation = self.relation.union(&form.to_relation()?);
        log::debug!("added entry {:?}", form.to_strings());
        Ok(())
    }

    /// 複数の見出しを追加します。
    pub fn extend<'a, I>(&mut self, forms: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Form>,
    {
        for form in forms {
            self.add_entry(form)?;
        }
        Ok(())
    }

    /// 規則（正準文字列上のトランスデューサ）をすべての見出しに適用します。
    ///
    /// 関係は `relation @ rule` に置き換えられ、元に戻すことはできません。
    /// 適用前のレキシコンが必要な場合は、事前に複製してください。
    pub fn add_rule(&mut self, rule: &Relation) {
        let relation = self.relation.compose(rule).optimized();
        log::debug!(
            "applied rule: {} states -> {} states",
            self.relation.fst().num_states(),
            relation.fst().num_states()
        );
        self.relation = relation;
    }

    /// 問い合わせに一致する見出しを返します。結果は整列されています。
    ///
    /// # エラー
    ///
    /// - 問い合わせに予約文字やアルファベット外の文字が含まれる場合、[`MorphoError::Encoding`] を返します。
    /// - 一致する見出しが無限にある場合、[`MorphoError::CyclicLanguage`] を返します。
    pub fn query(&self, query: &Query) -> Result<Vec<Form>> {
        let grammar = self.grammar();
        let top = query.top(&grammar)?;
        let bottom = query.bottom(&grammar)?;
        let result = top.compose(&self.relation).compose(&bottom);
        if result.is_cyclic() {
            log::warn!("the query matched infinitely many entries");
            return Err(MorphoError::CyclicLanguage);
        }
        let mut forms = result
            .items()?
            .map(|(top, bottom)| Form::from_strings(&top, &bottom))
            .collect::<Result<Vec<_>>>()?;
        forms.sort();
        Ok(forms)
    }

    /// すべての見出しのイテレータ
    ///
    /// # エラー
    ///
    /// 巡回している場合、[`MorphoError::CyclicLanguage`] を返します。
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Form>>> {
        Ok(self
            .relation
            .items()?
            .map(|(top, bottom)| Form::from_strings(&top, &bottom)))
    }

    /// すべての見出しを整列して返します。
    pub fn entries(&self) -> Result<Vec<Form>> {
        let mut forms = self.iter()?.collect::<Result<Vec<_>>>()?;
        forms.sort();
        Ok(forms)
    }

    /// 見出しの数
    pub fn len(&self) -> Result<usize> {
        self.relation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    /// 同じ見出し形に複数の表層形が対応する例を探します。
    ///
    /// [`Relation::find_ambiguity`] と同じく確率的な検査です。
    pub fn find_ambiguity(&self, strictness: usize) -> Option<(String, String)> {
        self.relation.find_ambiguity(strictness)
    }

    /// レキシコンをライタに書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合や、rkyvのシリアライズに失敗した場合にエラーを返します。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let data = LexiconData {
            alphabet: self.alphabet.to_string_lossless(),
            fst: self.relation.fst().clone(),
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)?;
        utils::write_archive(wtr, LEXICON_MAGIC, &bytes)
    }

    /// [`Lexicon::write`] で書き出したレキシコンを読み込みます。
    ///
    /// # エラー
    ///
    /// - マジックナンバーが一致しない場合、[`MorphoError::InvalidFormat`] を返します。
    /// - rkyvの検証に失敗した場合（データが壊れているか互換性がない場合）、[`MorphoError::RkyvError`] を返します。
    pub fn read<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let bytes = utils::read_archive(rdr, LEXICON_MAGIC)?;
        let data = rkyv::from_bytes::<LexiconData, rkyv::rancor::Error>(&bytes)?;
        if !data.fst.is_well_formed() {
            return Err(MorphoError::invalid_format("rdr", "a transition points outside the automaton"));
        }
        Ok(Self {
            relation: Relation::from_fst(data.fst),
            alphabet: Alphabet::new(data.alphabet.chars())?,
        })
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Lexicon {
    fn eq(&self, other: &Self) -> bool {
        self.relation == other.relation
    }
}

impl Eq for Lexicon {}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Lexicon")
            .field("alphabet", &self.alphabet)
            .field("relation", &self.relation)
            .finish()
    }
}

impl fmt::Display for Lexicon {
    /// 見出しを空行で区切って表示します。
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (paths, truncated): (Vec<_>, bool) = match self.relation.items() {
            Ok(paths) => (paths.collect(), false),
            Err(_) => (self.relation.fst().shortest_paths(DISPLAY_LIMIT), true),
        };
        let mut forms = vec![];
        let mut undecodable = vec![];
        for (top, bottom) in paths {
            match Form::from_strings(&top, &bottom) {
                Ok(form) => forms.push(form),
                Err(_) => undecodable.push((top, bottom)),
            }
        }
        forms.sort();
        undecodable.sort();

        // 復号できない経路は生の正準文字列だけを表示する
        let entries = forms
            .iter()
            .map(|form| {
                let (top, bottom) = form.to_strings();
                (Some(form.to_string()), top, bottom)
            })
            .chain(undecodable.into_iter().map(|(top, bottom)| (None, top, bottom)));
        for (i, (text, top, bottom)) in entries.enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            if let Some(text) = text {
                writeln!(f, "{text}")?;
            }
            writeln!(f, "{top}\n{bottom}")?;
        }
        if truncated {
            writeln!(f, "\n...")?;
        }
        Ok(())
    }
}
