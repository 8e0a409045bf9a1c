//! エラー型の定義
//!
//! このモジュールは、morphoライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;

/// morpho専用のResult型
///
/// エラー型としてデフォルトで[`MorphoError`]を使用します。
pub type Result<T, E = MorphoError> = std::result::Result<T, E>;

/// morphoのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// どのエラーも内部で再試行・握りつぶしはされず、そのまま呼び出し元へ返されます。
#[derive(Debug, thiserror::Error)]
pub enum MorphoError {
    /// 符号化エラー
    ///
    /// 予約文字やアルファベット外の文字がフィールドに含まれている場合に発生します。
    #[error(transparent)]
    Encoding(EncodingError),

    /// 復号エラー
    ///
    /// 正準文字列が文法に従っていない場合に発生します。
    #[error(transparent)]
    Decode(DecodeError),

    /// 無限言語の列挙エラー
    ///
    /// 巡回する（無限個のパスを持つ）関係を上限なしで列挙しようとした場合に発生します。
    /// 上限付きの列挙（`limit`）を指定してください。
    #[error("CyclicLanguageError: the relation is cyclic and may accept infinitely many strings; pass a limit")]
    CyclicLanguage,

    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// I/Oエラー
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    #[error(transparent)]
    RkyvError(#[from] rkyv::rancor::Error),
}

impl MorphoError {
    /// 符号化エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 問題のあったフィールド名
    /// * `msg` - エラーメッセージ
    pub(crate) fn encoding<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Encoding(EncodingError {
            arg,
            msg: msg.into(),
        })
    }

    /// 復号エラーを生成します
    ///
    /// # 引数
    ///
    /// * `input` - 復号しようとした文字列
    /// * `msg` - エラーメッセージ
    pub(crate) fn decode<I, S>(input: I, msg: S) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        Self::Decode(DecodeError {
            input: input.into(),
            msg: msg.into(),
        })
    }

    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 符号化エラーかどうかを返します。
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }

    /// 復号エラーかどうかを返します。
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// 無限言語の列挙エラーかどうかを返します。
    pub fn is_cyclic_language(&self) -> bool {
        matches!(self, Self::CyclicLanguage)
    }

    /// 無効な引数エラーかどうかを返します。
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// フィールドを正準文字列に符号化できない場合に使用されるエラー
#[derive(Debug)]
pub struct EncodingError {
    /// フィールドの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EncodingError: {}: {}", self.arg, self.msg)
    }
}

impl Error for EncodingError {}

/// 正準文字列を復号できない場合に使用されるエラー
#[derive(Debug)]
pub struct DecodeError {
    /// 入力文字列
    pub(crate) input: String,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DecodeError: {:?}: {}", self.input, self.msg)
    }
}

impl Error for DecodeError {}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}
