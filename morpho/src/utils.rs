//! シリアライズ用のヘルパー関数
//!
//! 関係とレキシコンは、マジックナンバー・パディング・rkyvのペイロードという
//! 同じレイアウトでファイルに保存されます。パディングにより、ペイロードの開始位置は
//! rkyvのアライメントに揃えられます。

use std::io::{Read, Write};

use rkyv::util::AlignedVec;

use crate::errors::{MorphoError, Result};

const RKYV_ALIGNMENT: usize = 16;

fn padding_len(magic: &[u8]) -> usize {
    (RKYV_ALIGNMENT - (magic.len() % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT
}

/// マジックナンバーとパディングに続けて、シリアライズ済みのバイト列を書き込みます。
pub(crate) fn write_archive<W>(mut wtr: W, magic: &[u8], bytes: &[u8]) -> Result<()>
where
    W: Write,
{
    wtr.write_all(magic)?;
    wtr.write_all(&vec![0xFF; padding_len(magic)])?;
    wtr.write_all(bytes)?;
    Ok(())
}

/// マジックナンバーを検証し、残りのペイロードをアライメントされたバッファに読み込みます。
///
/// # エラー
///
/// マジックナンバーが一致しない場合、[`MorphoError::InvalidFormat`] を返します。
pub(crate) fn read_archive<R>(mut rdr: R, magic: &[u8]) -> Result<AlignedVec<RKYV_ALIGNMENT>>
where
    R: Read,
{
    let mut header = vec![0; magic.len()];
    rdr.read_exact(&mut header)?;
    if header != magic {
        return Err(MorphoError::invalid_format(
            "rdr",
            "The magic number of the input data mismatches.",
        ));
    }

    let mut padding = vec![0; padding_len(magic)];
    rdr.read_exact(&mut padding)?;

    let mut buffer = Vec::new();
    rdr.read_to_end(&mut buffer)?;
    let mut aligned = AlignedVec::with_capacity(buffer.len());
    aligned.extend_from_slice(&buffer);
    Ok(aligned)
}
