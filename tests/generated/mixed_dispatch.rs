// @generated from phoneme inventory "mixed" (6 phonemes). Do not edit.

pub fn mixed_phoneme_len(buf: &[u8], pos: usize, len: usize) -> usize {
    let len = len.min(buf.len());
    if pos >= len {
        return 0;
    }
    let p = &buf[pos..len];
    match p.get(0).copied() {
        Some(0x61) => match p.get(1).copied() {
            Some(0x62) => 2,
            _ => 1,
        },
        Some(0x62) => 1,
        Some(0x74) => match p.get(1).copied() {
            Some(0xca) => match p.get(2).copied() {
                Some(0x83) => 3,
                _ => 1,
            },
            _ => 1,
        },
        Some(0xca) => match p.get(1).copied() {
            Some(0x83) => 2,
            _ => 0,
        },
        _ => 0,
    }
}

fn mixed_cost_len1(a: &[u8], b: &[u8]) -> f64 {
    match a[0] {
        0x61 => match b.len() {
            1 => match b[0] {
                0x61 => 0.0,
                0x74 => 1.5,
                _ => 1.0,
            },
            2 => match b[0] {
                0x61 => match b[1] {
                    0x62 => 0.5,
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        0x62 => match b.len() {
            1 => match b[0] {
                0x62 => 0.0,
                _ => 1.0,
            },
            2 => match b[0] {
                0x61 => match b[1] {
                    0x62 => 0.7,
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        0x74 => match b.len() {
            1 => match b[0] {
                0x61 => 1.5,
                0x74 => 0.0,
                _ => 1.0,
            },
            2 => match b[0] {
                0xca => match b[1] {
                    0x83 => 0.8,
                    _ => 1.0,
                },
                _ => 1.0,
            },
            3 => match b[0] {
                0x74 => match b[1] {
                    0xca => match b[2] {
                        0x83 => 0.25,
                        _ => 1.0,
                    },
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        _ => 1.0,
    }
}

fn mixed_cost_len2(a: &[u8], b: &[u8]) -> f64 {
    match a[0] {
        0x61 => match a[1] {
            0x62 => match b.len() {
                1 => match b[0] {
                    0x61 => 0.5,
                    0x62 => 0.7,
                    _ => 1.0,
                },
                2 => match b[0] {
                    0x61 => match b[1] {
                        0x62 => 0.0,
                        _ => 1.0,
                    },
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        0xca => match a[1] {
            0x83 => match b.len() {
                1 => match b[0] {
                    0x74 => 0.8,
                    _ => 1.0,
                },
                2 => match b[0] {
                    0xca => match b[1] {
                        0x83 => 0.0,
                        _ => 1.0,
                    },
                    _ => 1.0,
                },
                3 => match b[0] {
                    0x74 => match b[1] {
                        0xca => match b[2] {
                            0x83 => 0.4,
                            _ => 1.0,
                        },
                        _ => 1.0,
                    },
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        _ => 1.0,
    }
}

fn mixed_cost_len3(a: &[u8], b: &[u8]) -> f64 {
    match a[0] {
        0x74 => match a[1] {
            0xca => match a[2] {
                0x83 => match b.len() {
                    1 => match b[0] {
                        0x74 => 0.25,
                        _ => 1.0,
                    },
                    2 => match b[0] {
                        0xca => match b[1] {
                            0x83 => 0.4,
                            _ => 1.0,
                        },
                        _ => 1.0,
                    },
                    3 => match b[0] {
                        0x74 => match b[1] {
                            0xca => match b[2] {
                                0x83 => 0.0,
                                _ => 1.0,
                            },
                            _ => 1.0,
                        },
                        _ => 1.0,
                    },
                    _ => 1.0,
                },
                _ => 1.0,
            },
            _ => 1.0,
        },
        _ => 1.0,
    }
}

pub fn mixed_phoneme_cost(a: &[u8], a_off: usize, a_len: usize, b: &[u8], b_off: usize, b_len: usize) -> f64 {
    let a = match a_off.checked_add(a_len).and_then(|end| a.get(a_off..end)) {
        Some(a) => a,
        None => return 1.0,
    };
    let b = match b_off.checked_add(b_len).and_then(|end| b.get(b_off..end)) {
        Some(b) => b,
        None => return 1.0,
    };
    match a.len() {
        1 => mixed_cost_len1(a, b),
        2 => mixed_cost_len2(a, b),
        3 => mixed_cost_len3(a, b),
        _ => 1.0,
    }
}
