/*
 * 主な責務
 *  - endpoint ごとの permission scope を型として宣言する
 *  - handler は Can* alias を引数に取るだけで認可が掛かる
 */
use super::core::{Authorized, Permission};

pub enum GetDrinksDetail {}
impl Permission for GetDrinksDetail {
    const SCOPE: &'static str = "get:drinks-detail";
}
pub type CanGetDrinksDetail = Authorized<GetDrinksDetail>;

pub enum PostDrinks {}
impl Permission for PostDrinks {
    const SCOPE: &'static str = "post:drinks";
}
pub type CanPostDrinks = Authorized<PostDrinks>;

pub enum PatchDrinks {}
impl Permission for PatchDrinks {
    const SCOPE: &'static str = "patch:drinks";
}
pub type CanPatchDrinks = Authorized<PatchDrinks>;

pub enum DeleteDrinks {}
impl Permission for DeleteDrinks {
    const SCOPE: &'static str = "delete:drinks";
}
pub type CanDeleteDrinks = Authorized<DeleteDrinks>;
