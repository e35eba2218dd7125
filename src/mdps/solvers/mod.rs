pub mod backup;
pub mod mc_methods;
pub mod value_estimation;
pub mod value_iteration;
