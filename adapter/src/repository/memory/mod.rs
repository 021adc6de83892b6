// テストや組み込み実行で使うインメモリ実装。
// 判定ロジックは Postgres 実装と同じく kernel の check_admission を通す。
pub mod booking;
pub mod dog;
pub mod playground;
