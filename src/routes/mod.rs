pub mod default_route;
pub mod scrap_route;
