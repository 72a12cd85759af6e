#[macro_use]
extern crate rocket;

use pokemon_battle::rocket_initialize;

#[launch]
fn rocket() -> _ {
    rocket_initialize()
}
