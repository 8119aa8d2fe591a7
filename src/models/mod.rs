mod chromosome;
mod cost;
mod crossover;
mod graph;
mod patterns;
mod perceptron;
mod population;
mod probability;
mod sample;
mod selector;
mod termination;

pub use chromosome::{Chromosome, LENGTH_PENALTY};
pub use cost::Cost;
pub use crossover::CrossoverMethod;
pub use graph::{Graph, GraphError, MAX_GRAPH_SIZE, Node};
pub use patterns::demo_samples;
pub use perceptron::{Neuron, NeuronOutput, Perceptron, Prediction, PredictionError};
pub use population::{FitnessStatistics, GenerationRecord, Population};
pub use probability::{Probability, ProbabilityOutOfRange};
pub use sample::{Sample, SampleError};
pub use selector::{SelectionError, SelectionMethod, Selector};
pub use termination::{StopDecision, StopReason, StoppingCriteria, Terminated};

pub(crate) use perceptron::step;
