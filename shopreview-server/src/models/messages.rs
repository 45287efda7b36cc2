//! Response messages carried in the envelope `message` field

pub const NEED_LOGIN: &str = "login required";
pub const NO_USER: &str = "user does not exist";
pub const NULL_VALUE: &str = "required value is missing";
pub const OUT_OF_VALUE: &str = "value is out of range";
pub const NO_REVIEW: &str = "review does not exist";
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

pub const SHOP_BY_AREA_SUCCESS: &str = "shops by area fetched";
pub const SHOP_BY_THEME_SUCCESS: &str = "shops by theme fetched";
pub const SHOP_BY_AREA_AND_THEME_SUCCESS: &str = "shops by area and theme fetched";

pub const GET_SHOP_REVIEWS_SUCCESS: &str = "shop reviews fetched";
pub const GET_RECENT_REVIEWS_SUCCESS: &str = "recent reviews fetched";
pub const GET_REVIEW_SUCCESS: &str = "review fetched";
pub const REVIEW_LIKE_SUCCESS: &str = "review like updated";
pub const REVIEW_SCRAP_SUCCESS: &str = "review scrap updated";
pub const DELETE_REVIEW_SUCCESS: &str = "review deleted";
