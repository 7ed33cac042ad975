//! Conversions between Python objects and Rust values.
use anyhow::{anyhow, Result};
use numpy::{PyArray1, PyArray3};
use pyo3::{
    types::{PyBool, PyDict, PyList, PyTuple},
    IntoPy, PyAny, PyObject, Python, ToPyObject,
};
use real2sim_core::{kwargs::KwargValue, Frame, InfoValue, ResetOptions, StepInfo};

/// Converts a frame to a numpy array.
pub fn frame_to_pyobj(py: Python, frame: &Frame) -> PyObject {
    PyArray3::<u8>::from_array(py, frame).into_py(py)
}

/// Converts a numpy array of shape `(height, width, 3)` and dtype `uint8` to a frame.
pub fn pyany_to_frame(obj: &PyAny) -> Result<Frame> {
    let arr: &PyArray3<u8> = obj.extract()?;
    Ok(arr.to_owned_array())
}

/// Converts a list of frames to a Python list of numpy arrays.
pub fn frames_to_pylist<'py>(py: Python<'py>, frames: &[Frame]) -> &'py PyList {
    PyList::new(py, frames.iter().map(|f| frame_to_pyobj(py, f)))
}

fn is_bool(value: &PyAny) -> Result<bool> {
    if value.is_instance::<PyBool>()? {
        return Ok(true);
    }
    // numpy.bool_
    Ok(value.get_type().name()?.starts_with("bool"))
}

/// Converts a value of an info dictionary.
pub fn pyany_to_info_value(value: &PyAny) -> Result<InfoValue> {
    if is_bool(value)? {
        return Ok(InfoValue::Bool(value.is_true()?));
    }
    if let Ok(v) = value.extract::<f64>() {
        return Ok(InfoValue::Number(v));
    }
    Ok(InfoValue::Text(value.str()?.to_string()))
}

/// Converts an info dictionary, keeping the order of keys.
pub fn pydict_to_step_info(dict: &PyDict) -> Result<StepInfo> {
    let mut info = StepInfo::empty();
    for (k, v) in dict.iter() {
        let key: String = k.extract()?;
        info.insert(key, pyany_to_info_value(v)?);
    }
    Ok(info)
}

/// Converts a build argument to a Python value.
pub fn kwarg_to_pyobj(py: Python, value: &KwargValue) -> PyObject {
    match value {
        KwargValue::None => py.None(),
        KwargValue::Bool(v) => v.to_object(py),
        KwargValue::Int(v) => v.to_object(py),
        KwargValue::Float(v) => v.to_object(py),
        KwargValue::Str(v) => v.to_object(py),
        KwargValue::List(v) => PyList::new(py, v.iter().map(|x| kwarg_to_pyobj(py, x))).into_py(py),
        KwargValue::Tuple(v) => PyTuple::new(py, v.iter().map(|x| kwarg_to_pyobj(py, x))).into_py(py),
    }
}

/// Converts reset options to the `options` argument of `env.reset()`.
pub fn reset_options_to_pydict<'py>(py: Python<'py>, options: &ResetOptions) -> Result<&'py PyDict> {
    let obj_init_options = PyDict::new(py);
    obj_init_options.set_item("init_xy", IntoPy::<pyo3::PyObject>::into_py(PyArray1::from_slice(py, &options.obj_init_xy[..]), py))?;

    let robot_init_options = PyDict::new(py);
    robot_init_options.set_item("init_xy", IntoPy::<pyo3::PyObject>::into_py(PyArray1::from_slice(py, &options.robot_init_xy[..]), py))?;
    robot_init_options.set_item(
        "init_rot_quat",
        IntoPy::<pyo3::PyObject>::into_py(PyArray1::from_slice(py, &options.robot_init_rot_quat[..]), py),
    )?;

    let dict = PyDict::new(py);
    dict.set_item("obj_init_options", obj_init_options)?;
    dict.set_item("robot_init_options", robot_init_options)?;
    Ok(dict)
}

/// Extracts a sequence of floats, or a single float as a sequence of length 1.
pub fn pyany_to_f64vec(obj: &PyAny) -> Result<Vec<f64>> {
    if let Ok(v) = obj.extract::<f64>() {
        return Ok(vec![v]);
    }
    obj.iter()?
        .map(|x| Ok(x?.extract::<f64>()?))
        .collect()
}

/// Extracts `N` floats stored at `key` of a dictionary.
pub fn get_f64_array<const N: usize>(dict: &PyAny, key: &str) -> Result<[f64; N]> {
    let v = pyany_to_f64vec(dict.get_item(key)?)?;
    let mut out = [0f64; N];
    if v.len() != N {
        return Err(anyhow!("Expected {} values for {:?}, got {:?}", N, key, v));
    }
    out.copy_from_slice(&v);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::types::IntoPyDict;

    #[test]
    fn test_info_values() -> Result<()> {
        Python::with_gil(|py| {
            let dict = vec![
                ("elapsed_steps", 3.into_py(py)),
                ("is_grasped", true.into_py(py)),
                ("qpos", 0.25.into_py(py)),
                ("episode_stats", "x".into_py(py)),
                ("success", false.into_py(py)),
            ]
            .into_py_dict(py);
            let info = pydict_to_step_info(dict)?;

            let keys: Vec<_> = info.iter().map(|(k, _)| k).collect();
            assert_eq!(keys, vec!["elapsed_steps", "is_grasped", "qpos", "episode_stats", "success"]);
            assert_eq!(info.get("elapsed_steps"), Some(&InfoValue::Number(3.0)));
            assert_eq!(info.get("is_grasped"), Some(&InfoValue::Bool(true)));
            assert_eq!(info.get("episode_stats"), Some(&InfoValue::Text("x".to_string())));
            assert!(!info.success());
            Ok(())
        })
    }

    #[test]
    fn test_kwarg_to_pyobj() -> Result<()> {
        let value = KwargValue::parse("[(a,1),(b,2.5)]")?;
        Python::with_gil(|py| {
            let obj = kwarg_to_pyobj(py, &value);
            assert_eq!(obj.as_ref(py).repr()?.to_string(), "[('a', 1), ('b', 2.5)]");
            let obj = kwarg_to_pyobj(py, &KwargValue::parse("None")?);
            assert!(obj.is_none(py));
            Ok(())
        })
    }

    #[test]
    fn test_f64_array() -> Result<()> {
        Python::with_gil(|py| {
            let dict = vec![("world_vector", vec![0.1, 0.2, 0.3].into_py(py)), ("gripper", 1.0.into_py(py))]
                .into_py_dict(py);
            assert_eq!(get_f64_array::<3>(dict, "world_vector")?, [0.1, 0.2, 0.3]);
            assert_eq!(get_f64_array::<1>(dict, "gripper")?, [1.0]);
            assert!(get_f64_array::<2>(dict, "world_vector").is_err());
            Ok(())
        })
    }

    #[test]
    #[ignore = "requires numpy"]
    fn test_frame_round_trip() -> Result<()> {
        let frame = Frame::from_shape_fn((2, 3, 3), |(i, j, k)| (i * 9 + j * 3 + k) as u8);
        Python::with_gil(|py| {
            let obj = frame_to_pyobj(py, &frame);
            assert_eq!(pyany_to_frame(obj.as_ref(py))?, frame);
            Ok(())
        })
    }
}
