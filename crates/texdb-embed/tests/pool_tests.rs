use candle_core::{DType, Device, Tensor};
use texdb_embed::{l2_normalize, masked_mean};

fn hidden(dev: &Device) -> Tensor {
    // batch of 2, three tokens, hidden dim 2
    Tensor::from_slice(
        &[1.0f32, 2.0, 3.0, 4.0, 100.0, 100.0, // row 0
          2.0, 2.0, 4.0, 6.0, 6.0, 10.0],      // row 1
        (2, 3, 2),
        dev,
    )
    .unwrap()
}

#[test]
fn masked_mean_ignores_padding() {
    let dev = Device::Cpu;
    let mask = Tensor::from_slice(&[1u32, 1, 0, 1, 1, 1], (2, 3), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean(&hidden(&dev), &mask).unwrap().to_vec2().unwrap();

    assert_eq!(out[0], vec![2.0, 3.0]);
    assert_eq!(out[1], vec![4.0, 6.0]);
}

#[test]
fn fully_masked_row_pools_to_zero() {
    let dev = Device::Cpu;
    let mask = Tensor::from_slice(&[0f32, 0.0, 0.0, 1.0, 0.0, 0.0], (2, 3), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean(&hidden(&dev), &mask).unwrap().to_vec2().unwrap();

    assert_eq!(out[0], vec![0.0, 0.0]);
    assert_eq!(out[1], vec![2.0, 2.0]);
}

#[test]
fn l2_normalize_scales_rows_to_unit_length() {
    let dev = Device::Cpu;
    let emb = Tensor::from_slice(&[3.0f32, 4.0, 0.0, 0.0, 1.0, 0.0], (3, 2), &dev).unwrap();
    let out: Vec<Vec<f32>> = l2_normalize(&emb).unwrap().to_vec2().unwrap();

    assert!((out[0][0] - 0.6).abs() < 1e-6 && (out[0][1] - 0.8).abs() < 1e-6, "{:?}", out[0]);
    // zero rows stay zero instead of dividing by zero
    assert_eq!(out[1], vec![0.0, 0.0]);
    assert_eq!(out[2], vec![1.0, 0.0]);
}

#[test]
fn l2_normalize_half_precision() {
    let dev = Device::Cpu;
    let emb = Tensor::from_slice(&[3.0f32, 4.0, 0.0, 0.0], (2, 2), &dev).unwrap().to_dtype(DType::F16).unwrap();
    let out = l2_normalize(&emb).unwrap();
    assert_eq!(out.dtype(), DType::F16);

    let out: Vec<Vec<f32>> = out.to_dtype(DType::F32).unwrap().to_vec2().unwrap();
    assert!((out[0][0] - 0.6).abs() < 1e-3 && (out[0][1] - 0.8).abs() < 1e-3, "{:?}", out[0]);
    assert_eq!(out[1], vec![0.0, 0.0]);
}

#[test]
fn pooled_then_normalized() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[1.0f32, 2.0, 2.0, 9.0, 9.0, 9.0], (1, 2, 3), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0], (1, 2), &dev).unwrap();
    let out: Vec<Vec<f32>> = l2_normalize(&masked_mean(&h, &mask).unwrap()).unwrap().to_vec2().unwrap();

    // [1, 2, 2] has length 3
    let expected = [1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0];
    for (got, want) in out[0].iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "{got} vs {want}");
    }
}

#[test]
fn rejects_two_dimensional_hidden_state() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    let mask = Tensor::ones((2, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean(&h, &mask).is_err());
}
