//! # Morpho
//!
//! Morphoは、有限状態関係の上に構築された形態論的レキシコンの実装です。
//!
//! ## 概要
//!
//! 見出し形と表層形の解析結果は、それぞれ `^seg(gloss) ...$key(value) ...|` という
//! 正準文字列に符号化され、レキシコンは見出し形から表層形への1つの有限状態関係として保持されます。
//! 見出しの追加は和、規則の適用は合成、問い合わせは両側へのアクセプタの合成として実現されます。
//!
//! ## 主な機能
//!
//! - **関係代数**: 和・積・差・連接・合成・射影などを不変な値として提供する [`Relation`]
//! - **符号化**: 形態素列と素性の正準文字列への可逆な符号化（[`codec`]）
//! - **問い合わせ**: セグメント列・グロス列・素性の部分的な指定からのアクセプタ構築（[`Query`]）
//! - **規則**: 接尾辞・接頭辞の付加と条件付きの適用（[`rules`]）
//! - **永続化**: rkyvによる関係とレキシコンの読み書き
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use morpho::{Form, Lexicon, Query};
//!
//! let mut lexicon = Lexicon::new();
//! lexicon.add_entry(
//!     &Form::builder()
//!         .lemma_segmentation(["dog"])
//!         .lemma_gloss(["dog"])
//!         .segmentation(["dog", "s"])
//!         .gloss(["dog", "PL"])
//!         .feature("pos", "N")
//!         .build()?,
//! )?;
//!
//! let forms = lexicon.query(&Query::new().gloss(["dog", "PL"]))?;
//! assert_eq!(forms.len(), 1);
//! assert_eq!(forms[0].text(), "dogs");
//! assert_eq!(forms[0].segmentation(), vec!["dog", "s"]);
//! assert_eq!(forms[0].get("pos"), Some("N"));
//! # Ok(())
//! # }
//! ```

/// 形態素列・素性と正準文字列の相互変換
pub mod codec;

/// アルファベットの設定
pub mod config;

/// エラー型の定義
pub mod errors;

/// レキシコンの見出し
pub mod form;

/// 有限状態トランスデューサ
pub mod fst;

/// 正準文字列の文法
pub mod grammar;

/// レキシコンの実装
pub mod lexicon;

/// 問い合わせの構築
pub mod query;

/// 不変な集合として扱える有限状態関係
pub mod relation;

/// 書き換え規則
pub mod rules;

/// 内部ユーティリティ関数
mod utils;


// Re-exports
pub use codec::{Analysis, FeatureMap, Morpheme};
pub use config::Alphabet;
pub use errors::MorphoError;
pub use form::{Form, FormBuilder};
pub use fst::Side;
pub use lexicon::Lexicon;
pub use query::Query;
pub use relation::{IntoRelation, Relation};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
