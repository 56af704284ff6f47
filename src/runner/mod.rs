pub mod classes;
pub mod ds;
pub mod plugin;
