/// ステータス変更のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatusError {
    /// 呼び出し元が車両オーナーではない
    NotOwner,
}
