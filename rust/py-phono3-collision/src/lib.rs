use pyo3::prelude::*;

pub mod py_collision_matrix;

#[pymodule]
#[pyo3(name = "_py_phono3_collision")]
fn _py_phono3_collision(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<py_collision_matrix::PyCollisionMatrix>()?;
    module.add("THZ_TO_EV", phono3_collision::units::THZ_TO_EV)?;
    module.add("KB", phono3_collision::units::KB)?;
    Ok(())
}
