mod validators;

use crate::{error, pub_use_modules};

pub_use_modules!(
    id,
    level,
    text,
    credentials);

error!(ValidationError);
