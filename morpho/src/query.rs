//! 部分的な指定からの問い合わせアクセプタの構築
//!
//! セグメント列・グロス列・素性のうち、指定された次元だけを固定し、
//! 残りは任意の文字列を許すアクセプタを作成します。各次元のアクセプタの
//! 共通部分が最終的な問い合わせになります。

use crate::codec::{self, FeatureMap, END, FEATURES_START, MORPHEMES_START, SEPARATOR};
use crate::errors::Result;
use crate::grammar::Grammar;
use crate::relation::Relation;

/// レキシコンへの問い合わせ
///
/// 上側（見出し形）の条件と下側（表層形）の条件を組み立てます。
/// 素性の条件は両側に適用されます。
///
/// # 例
///
/// ```
/// use morpho::Query;
///
/// let query = Query::new()
///     .lemma_segmentation(["run"])
///     .gloss(["run", "PAST"])
///     .feature("pos", "V");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    lemma_segmentation: Option<Vec<String>>,
    lemma_gloss: Option<Vec<String>>,
    segmentation: Option<Vec<String>>,
    gloss: Option<Vec<String>>,
    features: Option<FeatureMap>,
}

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl Query {
    /// 何も制約しない問い合わせを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 見出し形のセグメント列を指定します。
    pub fn lemma_segmentation<I, S>(mut self, segmentation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lemma_segmentation = Some(to_strings(segmentation));
        self
    }

    /// 見出し形のグロス列を指定します。
    pub fn lemma_gloss<I, S>(mut self, gloss: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lemma_gloss = Some(to_strings(gloss));
        self
    }

    /// 表層形のセグメント列を指定します。
    pub fn segmentation<I, S>(mut self, segmentation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segmentation = Some(to_strings(segmentation));
        self
    }

    /// 表層形のグロス列を指定します。
    pub fn gloss<I, S>(mut self, gloss: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gloss = Some(to_strings(gloss));
        self
    }

    /// 素性を指定します。素性は完全に一致する必要があります。
    pub fn features(mut self, features: FeatureMap) -> Self {
        self.features = Some(features);
        self
    }

    /// 素性を1つ追加します。
    pub fn feature<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.features
            .get_or_insert_with(FeatureMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// 上側（見出し形）に対する問い合わせアクセプタを作成します。
    pub fn top(&self, grammar: &Grammar) -> Result<Relation> {
        compile(
            grammar,
            self.lemma_segmentation.as_deref(),
            self.lemma_gloss.as_deref(),
            self.features.as_ref(),
        )
    }

    /// 下側（表層形）に対する問い合わせアクセプタを作成します。
    pub fn bottom(&self, grammar: &Grammar) -> Result<Relation> {
        compile(
            grammar,
            self.segmentation.as_deref(),
            self.gloss.as_deref(),
            self.features.as_ref(),
        )
    }
}

fn check(grammar: &Grammar, arg: &'static str, s: &str) -> Result<()> {
    codec::validate(arg, s)?;
    grammar.alphabet().check(arg, s)
}

fn compile_morphemes(
    grammar: &Grammar,
    arg: &'static str,
    items: &[String],
    rewrite: &Relation,
) -> Result<Relation> {
    for item in items {
        check(grammar, arg, item)?;
    }
    let morphemes = if items.is_empty() {
        Relation::acceptor(&format!("{MORPHEMES_START}{FEATURES_START}"))?
    } else {
        let separator = SEPARATOR.to_string();
        let fenced = format!(
            "{MORPHEMES_START}{}{FEATURES_START}",
            items.join(separator.as_str())
        );
        Relation::acceptor(&fenced)?.compose(rewrite).valueset()
    };
    Ok(morphemes
        .concatenate(grammar.region())
        .concatenate(&Relation::acceptor(&END.to_string())?))
}

fn compile_features(grammar: &Grammar, features: &FeatureMap) -> Result<Relation> {
    for (key, value) in features {
        check(grammar, "feature key", key)?;
        check(grammar, "feature value", value)?;
    }
    let tail = format!("{FEATURES_START}{}{END}", codec::encode_features(features)?);
    Ok(Relation::acceptor(&MORPHEMES_START.to_string())?
        .concatenate(grammar.region())
        .concatenate(&Relation::acceptor(&tail)?))
}

/// 指定された次元の制約をすべて満たす正準文字列のアクセプタを作成します。
///
/// # 引数
///
/// * `grammar` - 正準文字列の文法
/// * `segmentation` - セグメント列。`None` の場合は制約しません。
/// * `gloss` - グロス列。`None` の場合は制約しません。
/// * `features` - 素性。`None` の場合は制約しません。
///
/// # エラー
///
/// 予約文字やアルファベット外の文字が含まれる場合、[`MorphoError::Encoding`](crate::errors::MorphoError::Encoding) を返します。
pub fn compile(
    grammar: &Grammar,
    segmentation: Option<&[String]>,
    gloss: Option<&[String]>,
    features: Option<&FeatureMap>,
) -> Result<Relation> {
    let mut constraints = vec![];
    if let Some(segmentation) = segmentation {
        constraints.push(compile_morphemes(
            grammar,
            "segmentation",
            segmentation,
            grammar.seg_rewrite(),
        )?);
    }
    if let Some(gloss) = gloss {
        constraints.push(compile_morphemes(grammar, "gloss", gloss, grammar.gloss_rewrite())?);
    }
    if let Some(features) = features {
        constraints.push(compile_features(grammar, features)?);
    }
    let mut constraints = constraints.into_iter();
    let Some(first) = constraints.next() else {
        return Ok(grammar.sigma_star().clone());
    };
    Ok(constraints.fold(first, |acc, c| acc.intersection(&c)))
}
