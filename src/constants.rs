pub mod bootstrap {

    pub const ADMIN_USERNAME: &str = "sweet";

    pub const ADMIN_PASSWORD: &str = "frost";
}

pub mod session {

    pub const USER_ID_KEY: &str = "user_id";

    pub const IS_ADMIN_KEY: &str = "is_admin";
}

pub mod routes {

    pub const LOGIN: &str = "/login";
}

pub mod limits {

    pub const MAX_USERNAME_LEN: usize = 64;
}
