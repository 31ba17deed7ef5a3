//! # lanesim
//!
//! アーケードレーサー向けのレーン追従ステアリング制御ライブラリです。
//!
//! - [`models`]: 車両・レーン・車線選択コントローラなどのモデル
//! - [`scenario`]: YAMLシナリオ（レベル構成）の読み込み
//! - [`simulation`]: ゲームループとレース進行
//! - [`logging`]: tracingによるログ出力の初期化

pub mod logging;
pub mod models;
pub mod scenario;
pub mod simulation;
