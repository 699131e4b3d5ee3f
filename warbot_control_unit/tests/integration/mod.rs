mod arbitration;
mod choreography;
mod disconnect;
mod replay;
