/// Fixed-length input sequences and the value that follows each of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceSet {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl SequenceSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Slides a `window`-long frame over `series`; each frame's target is the
/// next value.
pub fn build_sequences(series: &[f64], window: usize) -> SequenceSet {
    let mut set = SequenceSet::default();
    if window == 0 {
        return set;
    }
    for i in window..series.len() {
        set.inputs.push(series[i - window..i].to_vec());
        set.targets.push(series[i]);
    }
    set
}

/// Chronological split: the first `train_fraction` of sequences train, the
/// rest are held out.
pub fn train_test_split(set: SequenceSet, train_fraction: f64) -> (SequenceSet, SequenceSet) {
    let split = ((set.len() as f64) * train_fraction.clamp(0.0, 1.0)) as usize;

    let SequenceSet {
        mut inputs,
        mut targets,
    } = set;
    let test = SequenceSet {
        inputs: inputs.split_off(split),
        targets: targets.split_off(split),
    };

    (SequenceSet { inputs, targets }, test)
}
