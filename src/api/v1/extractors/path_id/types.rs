/*
 * 主な責務
 *  - リソースごとの「意味付きID型」を宣言する
 */
use super::core::PathId;

// drinks
pub enum DrinkTag {}
pub type DrinkId = PathId<DrinkTag>;
