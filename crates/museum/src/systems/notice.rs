use crate::prelude::*;

pub fn expire_notices(mut notices: ResMut<Notices>, time: Res<Time>) {
    notices.expire(time.0);
}
